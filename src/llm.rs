// src/llm.rs

use crate::config::LlmSection;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Keep prompts inside the model's context window.
const MAX_PROMPT_CHARS: usize = 12_000;

/// Why a completion call failed. Callers decide whether to absorb
/// these (categorization, insights) or surface them.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation service error {code}: {message}")]
    Service { code: String, message: String },
    #[error("generation transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation service returned no output text")]
    EmptyOutput,
}

/// Boundary seam for the external text-generation service.
#[async_trait]
pub trait GenerateText: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters<'a>,
}

#[derive(Debug, Serialize)]
struct GenerationInput<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationParameters<'a> {
    top_p: f64,
    result_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    output: Option<GenerationOutput>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerationOutput {
    text: Option<String>,
}

/// Text-generation client for a DashScope-style completion endpoint.
pub struct GenerationClient {
    client: Client,
    base_url: String,
    model: String,
    top_p: f64,
    result_format: String,
    api_key: String,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(cfg: &LlmSection) -> Result<Self, Box<dyn std::error::Error>> {
        let api_key = std::env::var("DASHSCOPE_API_KEY")
            .map_err(|_| "DASHSCOPE_API_KEY env var required")?;
        info!(url = %cfg.base_url, model = %cfg.model, "Using generation endpoint");
        Ok(GenerationClient {
            client: Client::new(),
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
            top_p: cfg.top_p,
            result_format: cfg.result_format.clone(),
            api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }
}

#[async_trait]
impl GenerateText for GenerationClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let prompt = truncate_to_boundary(prompt, MAX_PROMPT_CHARS);

        let request = GenerationRequest {
            model: &self.model,
            input: GenerationInput { prompt },
            parameters: GenerationParameters {
                top_p: self.top_p,
                result_format: &self.result_format,
            },
        };

        let url = format!("{}/services/aigc/text-generation/generation", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // Error bodies usually carry code/message; fall back to the
            // raw body when they don't decode.
            let (code, message) = match serde_json::from_str::<GenerationResponse>(&body) {
                Ok(decoded) => (
                    decoded.code.unwrap_or_else(|| status.to_string()),
                    decoded.message.unwrap_or(body),
                ),
                Err(_) => (status.to_string(), body),
            };
            return Err(GenerationError::Service { code, message });
        }

        let decoded: GenerationResponse = response.json().await?;
        decoded
            .output
            .and_then(|o| o.text)
            .ok_or(GenerationError::EmptyOutput)
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
