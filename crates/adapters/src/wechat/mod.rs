//! WeChat Official Account API adapter
//!
//! One client implements both the token and the draft/publish ports. Tokens
//! are fetched fresh for every call to [`TokenProvider::fetch_token`] and are
//! never cached.
//!
//! [`TokenProvider::fetch_token`]: wechat_publisher_domain::TokenProvider::fetch_token

mod draft;
mod token;

use reqwest::Client;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";

/// Platform request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the WeChat platform API
pub struct WechatClient {
    client: Client,
    app_id: String,
    app_secret: SecretString,
    base_url: String,
}

impl WechatClient {
    pub fn new(app_id: String, app_secret: SecretString) -> Self {
        Self::with_base_url(
            app_id,
            app_secret,
            DEFAULT_BASE_URL.to_string(),
            DEFAULT_TIMEOUT_SECS,
        )
    }

    pub fn with_base_url(
        app_id: String,
        app_secret: SecretString,
        base_url: String,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            app_id,
            app_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
