//! Git command - status and history of the content repository

use anyhow::{Context, Result};
use std::path::PathBuf;
use wechat_publisher_adapters::git::GitCli;

use crate::args::{GitArgs, GitCommands};
use crate::config::AppConfig;

pub async fn execute(args: GitArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let git = GitCli::new(&config.git.repo_path);

    match args.command {
        GitCommands::Status { json } => show_status(&git, json).await,
        GitCommands::Log { limit, json } => show_log(&git, limit, json).await,
    }
}

async fn show_status(git: &GitCli, json: bool) -> Result<()> {
    let status = git.status().await.context("Failed to read git status")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Branch: {}", status.branch.as_deref().unwrap_or("(detached)"));
    if status.clean {
        println!("Working tree clean");
    } else {
        for file in &status.files {
            println!("  {} {}", file.status, file.path);
        }
    }

    Ok(())
}

async fn show_log(git: &GitCli, limit: usize, json: bool) -> Result<()> {
    let commits = git.log(limit).await.context("Failed to read git log")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&commits)?);
        return Ok(());
    }

    if commits.is_empty() {
        println!("No commits yet.");
    }
    for commit in &commits {
        println!("{}  {}  {}  {}", commit.hash, commit.date, commit.author, commit.message);
    }

    Ok(())
}
