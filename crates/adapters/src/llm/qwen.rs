//! Alibaba DashScope (Qwen) text generation adapter

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wechat_publisher_domain::{GenerateError, TextGenerator};

use super::{GeneratorConfig, check_status, request_error};

pub const BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";
pub const DEFAULT_MODEL: &str = "qwen-turbo";

pub struct QwenGenerator {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: GeneratorConfig,
}

impl QwenGenerator {
    pub fn new(api_key: SecretString, config: GeneratorConfig) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string(), config)
    }

    pub fn with_base_url(api_key: SecretString, base_url: String, config: GeneratorConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        }
    }
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationInput<'a> {
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct GenerationParameters {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerationResponse {
    output: Option<GenerationOutput>,
}

#[derive(Deserialize)]
struct GenerationOutput {
    text: Option<String>,
}

#[async_trait]
impl TextGenerator for QwenGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerationRequest {
            model: &self.config.model,
            input: GenerationInput {
                messages: [Message {
                    role: "user",
                    content: prompt,
                }],
            },
            parameters: GenerationParameters {
                temperature: self.config.temperature,
            },
        };

        let url = format!(
            "{}/services/aigc/text-generation/generation",
            self.base_url
        );

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let api_response: GenerationResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerateError::InvalidFormat(e.to_string()))?;

        api_response
            .output
            .and_then(|o| o.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GenerateError::InvalidFormat("Missing output.text".to_string()))
    }

    fn provider(&self) -> &'static str {
        "qwen"
    }
}
