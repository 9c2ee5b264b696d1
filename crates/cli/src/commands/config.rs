//! Config command - write and inspect configuration

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

pub async fn execute(args: ConfigArgs, config_path: Option<PathBuf>) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => init_config(&path, force),
        ConfigCommands::Show { json } => show_config(config_path, json),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, AppConfig::example_toml())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    // Read it back through the same loader the other commands use
    let config = AppConfig::load(Some(path))
        .with_context(|| format!("Written config does not load: {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote config file");
    println!("Created config file: {}", path.display());
    println!("  Database: {}", config.general.db_path.display());
    println!("  Articles: {}", config.general.articles_dir.display());
    println!(
        "  Mode: {}",
        if config.publish.draft_mode {
            "draft (pass --publish to submit)"
        } else {
            "publish"
        }
    );
    println!();
    println!(
        "Next: set wechat.app_id, export {}, then run 'wechat-publisher articles import'",
        config.wechat.app_secret_env
    );

    Ok(())
}

fn show_config(config_path: Option<PathBuf>, json: bool) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    // Secrets live in env vars, so the config itself is safe to print
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", toml::to_string_pretty(&config).context("Failed to render config")?);
    }

    Ok(())
}
