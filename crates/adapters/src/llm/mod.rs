//! Text generation provider adapters

pub mod chat_completions;
pub mod qwen;
pub mod stub;

pub use chat_completions::ChatCompletionsGenerator;
pub use qwen::QwenGenerator;
pub use stub::StubGenerator;

use serde::{Deserialize, Serialize};
use wechat_publisher_domain::GenerateError;

/// Common generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model name/ID
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "glm-4-flash".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

/// Model used by a provider when none is configured
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "glm" => Some(chat_completions::GLM_DEFAULT_MODEL),
        "minimax" => Some(chat_completions::MINIMAX_DEFAULT_MODEL),
        "qwen" => Some(qwen::DEFAULT_MODEL),
        _ => None,
    }
}

fn request_error(e: reqwest::Error) -> GenerateError {
    if e.is_timeout() {
        GenerateError::Timeout
    } else {
        GenerateError::Api(e.to_string())
    }
}

/// Turn a non-2xx response into an API error carrying the body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerateError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(GenerateError::Api(format!(
        "API returned {}: {}",
        status, body
    )))
}
