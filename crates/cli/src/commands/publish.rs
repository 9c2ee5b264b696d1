//! Publish commands - push stored or freshly imported articles to WeChat

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use wechat_publisher_adapters::{
    git::GitCli, source::FsArticleSource, store::SqliteArticleStore, wechat::WechatClient,
};
use wechat_publisher_domain::{
    PublishMode, PublishOutcome, SystemClock,
    usecases::{AutoCommitConfig, ImportArticles, PublishConfig, PublishWorkflow},
};

use crate::args::{PublishArgs, PublishFileArgs};
use crate::commands::{load_secret, open_store};
use crate::config::AppConfig;

pub(crate) type Workflow = PublishWorkflow<
    SqliteArticleStore,
    SqliteArticleStore,
    WechatClient,
    WechatClient,
    GitCli,
    SystemClock,
>;

pub async fn execute(args: PublishArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = open_store(&config).await?;
    let workflow = build_workflow(&config, store)?;

    let draft_mode = config.publish.draft_mode && !args.publish;
    let outcome = workflow
        .publish(args.id, draft_mode)
        .await
        .with_context(|| format!("Failed to publish article {}", args.id))?;

    print_outcome(args.id, &outcome, args.json)
}

pub async fn execute_file(args: PublishFileArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let articles_dir = args
        .articles_dir
        .unwrap_or_else(|| config.general.articles_dir.clone());

    let source = Arc::new(
        FsArticleSource::new(&articles_dir)
            .with_context(|| format!("No articles directory at {}", articles_dir.display()))?,
    );
    let store = open_store(&config).await?;
    let import = ImportArticles::new(source, Arc::clone(&store));

    let article = match args.file.as_deref() {
        Some(file) => import.import_file(file).await,
        None => import.import_latest().await,
    }
    .with_context(|| format!("No article to publish in {}", articles_dir.display()))?;

    tracing::info!(
        article_id = article.id,
        source_file = %article.source_file,
        title = %article.title,
        author = %article.author,
        "Imported article"
    );

    let workflow = build_workflow(&config, store)?;
    let draft_mode = config.publish.draft_mode && !args.publish;
    let outcome = workflow
        .publish(article.id, draft_mode)
        .await
        .with_context(|| format!("Failed to publish {}", article.source_file))?;

    print_outcome(article.id, &outcome, false)
}

pub(crate) fn build_workflow(config: &AppConfig, store: Arc<SqliteArticleStore>) -> Result<Workflow> {
    if config.wechat.app_id.trim().is_empty() {
        bail!("wechat.app_id is not configured");
    }
    let app_secret = load_secret(&config.wechat.app_secret_env, "wechat app secret")?;

    let client = Arc::new(WechatClient::with_base_url(
        config.wechat.app_id.clone(),
        app_secret,
        config.wechat.base_url.clone(),
        config.wechat.timeout_secs,
    ));

    Ok(PublishWorkflow::new(
        Arc::clone(&store),
        store,
        Arc::clone(&client),
        client,
        Arc::new(GitCli::new(&config.git.repo_path)),
        Arc::new(SystemClock),
        publish_config_from_config(config),
    ))
}

fn publish_config_from_config(config: &AppConfig) -> PublishConfig {
    let auto_commit = config.git.auto_commit.then(|| AutoCommitConfig {
        message_template: config.git.commit_message_template.clone(),
        push: config.git.auto_push,
        remote: config.git.remote.clone(),
        branch: non_empty(&config.git.branch),
    });

    PublishConfig {
        default_cover_media_id: non_empty(&config.wechat.default_cover_media_id),
        auto_commit,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn print_outcome(article_id: i64, outcome: &PublishOutcome, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "article_id": article_id,
            "media_id": outcome.media_id,
            "mode": outcome.mode.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Draft created, media_id: {}", outcome.media_id);
    match outcome.mode {
        PublishMode::Publish => println!("Article submitted for publication"),
        PublishMode::Draft => {
            println!("Saved to the draft box; review and publish it from the WeChat console")
        }
    }

    Ok(())
}
