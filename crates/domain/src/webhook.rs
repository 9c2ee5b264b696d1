//! Repository webhook checks
//!
//! Deliveries are signed with one shared secret as `sha256=<hex hmac>` over
//! the raw body, the way GitHub sends `X-Hub-Signature-256`.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Signature verification failed")]
    InvalidSignature,
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// What a verified delivery told us
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookReceipt {
    pub event: String,
    /// Only meaningful for `push`; true when a commit touched the articles directory
    pub articles_changed: bool,
}

#[derive(Deserialize)]
struct PushPayload {
    #[serde(default)]
    commits: Vec<PushCommit>,
}

#[derive(Deserialize)]
struct PushCommit {
    #[serde(default)]
    added: Vec<String>,
    #[serde(default)]
    modified: Vec<String>,
    #[serde(default)]
    removed: Vec<String>,
}

/// Check `signature` against the HMAC of `payload`.
///
/// An empty secret disables verification. With a secret configured, a
/// missing or malformed signature fails.
pub fn verify_signature(payload: &[u8], signature: Option<&str>, secret: &str) -> bool {
    if secret.is_empty() {
        return true;
    }

    let Some(expected) = signature
        .and_then(|s| s.strip_prefix(SIGNATURE_PREFIX))
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);

    // Constant-time comparison
    mac.verify_slice(&expected).is_ok()
}

/// Hex signature for `payload`, in the header format
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Verify a delivery and summarize it
pub fn handle_delivery(
    event: &str,
    payload: &[u8],
    signature: Option<&str>,
    secret: &str,
    articles_dir: &str,
) -> Result<WebhookReceipt, WebhookError> {
    if !verify_signature(payload, signature, secret) {
        tracing::warn!(event, "Webhook signature rejected");
        return Err(WebhookError::InvalidSignature);
    }

    let articles_changed = if event == "push" {
        let push: PushPayload = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
        let dir = articles_dir.trim_start_matches("./").trim_matches('/');
        let prefix = format!("{}/", dir);
        push.commits.iter().any(|commit| {
            commit
                .added
                .iter()
                .chain(&commit.modified)
                .chain(&commit.removed)
                .any(|file| file.starts_with(&prefix))
        })
    } else {
        false
    };

    tracing::info!(event, articles_changed, "Webhook accepted");
    Ok(WebhookReceipt {
        event: event.to_string(),
        articles_changed,
    })
}
