//! Access token acquisition

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use wechat_publisher_domain::{AuthError, Credential, TokenProvider};

use super::WechatClient;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[async_trait]
impl TokenProvider for WechatClient {
    async fn fetch_token(&self) -> Result<Credential, AuthError> {
        let response = self
            .client
            .get(self.url("/cgi-bin/token"))
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        // The platform reports failures in the body, usually with HTTP 200
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let token = serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|r| r.access_token)
            .filter(|t| !t.is_empty());

        match token {
            Some(token) => {
                tracing::debug!("Obtained access token");
                Ok(Credential::new(SecretString::new(token.into())))
            }
            None => {
                tracing::warn!(body = %body, "Token response carried no access_token");
                Err(AuthError::MissingToken { body })
            }
        }
    }
}
