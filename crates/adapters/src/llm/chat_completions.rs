//! OpenAI-style chat completions adapter (GLM, MiniMax)

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wechat_publisher_domain::{GenerateError, TextGenerator};

use super::{GeneratorConfig, check_status, request_error};

pub const GLM_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";
pub const GLM_DEFAULT_MODEL: &str = "glm-4-flash";
pub const MINIMAX_BASE_URL: &str = "https://api.minimax.chat/v1";
pub const MINIMAX_DEFAULT_MODEL: &str = "abab6.5s-chat";

/// Generator for providers speaking the chat completions protocol
pub struct ChatCompletionsGenerator {
    client: Client,
    provider: &'static str,
    api_key: SecretString,
    url: String,
    config: GeneratorConfig,
}

impl ChatCompletionsGenerator {
    pub fn new(
        provider: &'static str,
        api_key: SecretString,
        url: String,
        config: GeneratorConfig,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            provider,
            api_key,
            url,
            config,
        }
    }

    /// Zhipu GLM, `{base}/chat/completions`
    pub fn glm(api_key: SecretString, base_url: Option<&str>, config: GeneratorConfig) -> Self {
        let base = base_url.unwrap_or(GLM_BASE_URL).trim_end_matches('/');
        Self::new("glm", api_key, format!("{}/chat/completions", base), config)
    }

    /// MiniMax, `{base}/text/chatcompletion_v2`
    pub fn minimax(api_key: SecretString, base_url: Option<&str>, config: GeneratorConfig) -> Self {
        let base = base_url.unwrap_or(MINIMAX_BASE_URL).trim_end_matches('/');
        Self::new(
            "minimax",
            api_key,
            format!("{}/text/chatcompletion_v2", base),
            config,
        )
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let api_response: ChatCompletionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerateError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerateError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }

    fn provider(&self) -> &'static str {
        self.provider
    }
}
