//! Webhook command - verify a saved delivery

use anyhow::{Context, Result, bail};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use wechat_publisher_domain::webhook::handle_delivery;

use crate::args::{WebhookArgs, WebhookCommands};
use crate::config::AppConfig;

pub async fn execute(args: WebhookArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    match args.command {
        WebhookCommands::Verify {
            payload_file,
            signature,
            event,
            json,
        } => verify(&config, payload_file, signature, &event, json),
    }
}

fn verify(
    config: &AppConfig,
    payload_file: PathBuf,
    signature: Option<String>,
    event: &str,
    json: bool,
) -> Result<()> {
    let payload = std::fs::read(&payload_file)
        .with_context(|| format!("Failed to read {}", payload_file.display()))?;

    let secret = SecretString::new(
        std::env::var(&config.webhook.secret_env)
            .unwrap_or_default()
            .into(),
    );
    if secret.expose_secret().is_empty() {
        tracing::warn!(
            env_var = %config.webhook.secret_env,
            "No webhook secret set, skipping signature check"
        );
    }

    let articles_dir = config.general.articles_dir.to_string_lossy();
    let receipt = match handle_delivery(
        event,
        &payload,
        signature.as_deref(),
        secret.expose_secret(),
        &articles_dir,
    ) {
        Ok(receipt) => receipt,
        Err(e) => bail!("Webhook rejected: {}", e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    } else {
        println!("✓ {} event accepted", receipt.event);
        if receipt.articles_changed {
            println!("  Articles changed; run 'wechat-publisher articles import'");
        }
    }

    Ok(())
}
