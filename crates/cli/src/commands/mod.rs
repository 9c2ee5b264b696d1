//! Command implementations and shared wiring

pub mod articles;
pub mod config;
pub mod generate;
pub mod git;
pub mod logs;
pub mod publish;
pub mod schedule;
pub mod webhook;

use anyhow::{Context, Result, bail};
use secrecy::SecretString;
use std::sync::Arc;
use wechat_publisher_adapters::store::SqliteArticleStore;

use crate::config::AppConfig;

/// Open the SQLite store named in the config
pub(crate) async fn open_store(config: &AppConfig) -> Result<Arc<SqliteArticleStore>> {
    let store = SqliteArticleStore::new(&config.general.db_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open database {}",
                config.general.db_path.display()
            )
        })?;
    Ok(Arc::new(store))
}

/// Read a secret from the environment variable named in the config
pub(crate) fn load_secret(env_var: &str, purpose: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No env var configured for {}", purpose);
    }

    let value = std::env::var(env_var)
        .with_context(|| format!("Missing env var {} for {}", env_var, purpose))?;

    if value.trim().is_empty() {
        bail!("Env var {} is empty for {}", env_var, purpose);
    }

    Ok(SecretString::new(value.into()))
}
