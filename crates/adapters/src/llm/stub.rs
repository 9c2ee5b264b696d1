//! Stub generator for testing and offline mode

use async_trait::async_trait;
use wechat_publisher_domain::{GenerateError, TextGenerator};

/// Generator that never leaves the process
pub struct StubGenerator {
    response: Option<String>,
    fail: bool,
}

impl StubGenerator {
    /// Builds a short article around the keyword found in the prompt
    pub fn echo() -> Self {
        Self {
            response: None,
            fail: false,
        }
    }

    /// Always returns `response`
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            fail: false,
        }
    }

    /// Always fails with an API error
    pub fn failing() -> Self {
        Self {
            response: None,
            fail: true,
        }
    }
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        if self.fail {
            return Err(GenerateError::Api("Stub generator failure".to_string()));
        }

        if let Some(response) = &self.response {
            return Ok(response.clone());
        }

        let keyword = prompt
            .lines()
            .find_map(|line| line.strip_prefix("关键词:"))
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or("stub");

        Ok(format!(
            "# {keyword}\n\n关于 {keyword} 的示例文章。\n\n## 要点\n\n- **{keyword}** 简介\n"
        ))
    }

    fn provider(&self) -> &'static str {
        "stub"
    }
}
