// src/ocr.rs

use crate::config::OcrSection;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Why a recognition call failed. The upload pipeline surfaces these
/// to the caller unchanged; there are no retries.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR service error {status}: {message}")]
    Service { status: u16, message: String },
    #[error("OCR transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Recognized text plus the service's request id, when it sends one.
#[derive(Debug, Clone)]
pub struct OcrOutput {
    pub content: String,
    pub request_id: Option<String>,
}

/// Boundary seam for the external text-recognition service.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<OcrOutput, OcrError>;
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(rename = "Data")]
    data: Option<RecognizeData>,
    #[serde(rename = "RequestId")]
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecognizeData {
    #[serde(rename = "Content", default)]
    content: String,
}

/// Receipt-recognition client: posts raw image bytes, gets text back.
pub struct ReceiptOcrClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl ReceiptOcrClient {
    pub fn new(cfg: &OcrSection) -> Result<Self, Box<dyn std::error::Error>> {
        let api_key =
            std::env::var("OCR_API_KEY").map_err(|_| "OCR_API_KEY env var required")?;
        info!(url = %cfg.base_url, "Using receipt OCR endpoint");
        Ok(ReceiptOcrClient {
            client: Client::new(),
            base_url: cfg.base_url.clone(),
            api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }
}

#[async_trait]
impl TextRecognizer for ReceiptOcrClient {
    async fn recognize(&self, image: &[u8]) -> Result<OcrOutput, OcrError> {
        let url = format!("{}/ocr/recognize-receipt", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/octet-stream")
            .body(image.to_vec())
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(OcrError::Service { status, message });
        }

        let body: RecognizeResponse = response.json().await?;
        let content = body.data.map(|d| d.content).unwrap_or_default();
        info!(chars = content.len(), request_id = ?body.request_id, "OCR text received");

        Ok(OcrOutput {
            content,
            request_id: body.request_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_recognize_response() {
        let body = r#"{"Data": {"Content": "Cafe Luna\nTotal $4.00"}, "RequestId": "req-1"}"#;
        let parsed: RecognizeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.unwrap().content, "Cafe Luna\nTotal $4.00");
        assert_eq!(parsed.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn missing_fields_decode_to_empty_content() {
        let parsed: RecognizeResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.data.is_none());

        let parsed: RecognizeResponse = serde_json::from_str(r#"{"Data": {}}"#).unwrap();
        assert_eq!(parsed.data.unwrap().content, "");
    }
}
