//! wechat-publisher CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; the flag wins over the config file
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| {
            AppConfig::load(cli.config.as_deref())
                .ok()
                .map(|c| c.general.log_level)
        })
        .unwrap_or_else(|| "info".to_string());
    init_logging(&log_level)?;

    // Execute command
    match cli.command {
        Commands::Publish(args) => commands::publish::execute(args, cli.config).await,
        Commands::PublishFile(args) => commands::publish::execute_file(args, cli.config).await,
        Commands::Articles(args) => commands::articles::execute(args, cli.config).await,
        Commands::Logs(args) => commands::logs::execute(args, cli.config).await,
        Commands::Schedule(args) => commands::schedule::execute(args, cli.config).await,
        Commands::Generate(args) => commands::generate::execute(args, cli.config).await,
        Commands::Git(args) => commands::git::execute(args, cli.config).await,
        Commands::Webhook(args) => commands::webhook::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args, cli.config).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
