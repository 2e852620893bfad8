use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ocr: OcrSection,
    #[serde(default)]
    pub llm: LlmSection,
}

#[derive(Debug, Deserialize)]
pub struct OcrSection {
    #[serde(default = "default_ocr_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_result_format")]
    pub result_format: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ocr_base_url() -> String {
    "https://ocr-api.cn-hangzhou.aliyuncs.com".to_string()
}

fn default_llm_base_url() -> String {
    "https://dashscope.aliyuncs.com/api/v1".to_string()
}

fn default_model() -> String {
    "qwen-max".to_string()
}

fn default_top_p() -> f64 {
    0.8
}

fn default_result_format() -> String {
    "text".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for OcrSection {
    fn default() -> Self {
        OcrSection {
            base_url: default_ocr_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        LlmSection {
            base_url: default_llm_base_url(),
            model: default_model(),
            top_p: default_top_p(),
            result_format: default_result_format(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the config file if it exists; otherwise run on defaults.
    /// API keys always come from the environment, never from the file.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if path.exists() {
            info!(path = %path.display(), "Loading config");
            Self::load(path)
        } else {
            info!(path = %path.display(), "No config file — using defaults");
            Ok(Config::default())
        }
    }
}
