//! Logs command - recent publish attempts

use anyhow::{Context, Result};
use std::path::PathBuf;
use wechat_publisher_domain::PublishLog;

use crate::args::LogsArgs;
use crate::commands::open_store;
use crate::config::AppConfig;

pub async fn execute(args: LogsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = open_store(&config).await?;

    let attempts = store
        .recent(args.limit)
        .await
        .context("Failed to read publish log")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&attempts)?);
        return Ok(());
    }

    if attempts.is_empty() {
        println!("No publish attempts recorded.");
        return Ok(());
    }

    for attempt in &attempts {
        let marker = if attempt.is_success() { "✓" } else { "✗" };
        println!(
            "{} {}  article {:>4}  {:<7}  {}",
            marker,
            attempt.attempted_at,
            attempt.article_id,
            attempt.mode.as_str(),
            if attempt.is_success() {
                attempt.media_id.as_str()
            } else {
                attempt.result.as_str()
            }
        );
    }

    Ok(())
}
