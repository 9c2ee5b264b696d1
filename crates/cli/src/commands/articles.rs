//! Articles command - manage stored articles

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use wechat_publisher_adapters::source::FsArticleSource;
use wechat_publisher_domain::{
    Article, ArticlePatch, ArticleStatus, ArticleStore, NewArticle, usecases::ImportArticles,
};

use crate::args::{ArticleFields, ArticlesArgs, ArticlesCommands};
use crate::commands::open_store;
use crate::config::AppConfig;

pub async fn execute(args: ArticlesArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    match args.command {
        ArticlesCommands::List { json } => list_articles(&config, json).await,
        ArticlesCommands::Show { id, json } => show_article(&config, id, json).await,
        ArticlesCommands::Create {
            title,
            fields,
            json,
        } => create_article(&config, title, fields, json).await,
        ArticlesCommands::Edit {
            id,
            title,
            fields,
            status,
        } => edit_article(&config, id, title, fields, status).await,
        ArticlesCommands::Import { file, articles_dir } => {
            import_articles(&config, file, articles_dir).await
        }
        ArticlesCommands::Delete { id } => delete_article(&config, id).await,
    }
}

async fn list_articles(config: &AppConfig, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let articles = store.list().await.context("Failed to list articles")?;

    if json {
        let output = serde_json::json!({
            "count": articles.len(),
            "articles": articles.iter().map(|a| serde_json::json!({
                "id": a.id,
                "title": a.title,
                "author": a.author,
                "status": a.status.as_str(),
                "source_file": a.source_file,
                "updated_at": a.updated_at.format(&Rfc3339).unwrap_or_default(),
            })).collect::<Vec<_>>()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if articles.is_empty() {
        println!("No articles stored.");
        return Ok(());
    }

    println!("Articles ({} stored)", articles.len());
    println!("=================");
    for article in &articles {
        println!(
            "{:>4}  [{}]  {}",
            article.id,
            article.status.as_str(),
            article.title
        );
    }

    Ok(())
}

async fn show_article(config: &AppConfig, id: i64, json: bool) -> Result<()> {
    let store = open_store(config).await?;
    let Some(article) = store.get(id).await.context("Failed to load article")? else {
        bail!("Article {} not found", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&article)?);
    } else {
        print_article(&article);
    }

    Ok(())
}

fn print_article(article: &Article) {
    println!("ID: {}", article.id);
    println!("  Title: {}", article.title);
    if !article.author.is_empty() {
        println!("  Author: {}", article.author);
    }
    if !article.category.is_empty() {
        println!("  Category: {}", article.category);
    }
    if !article.summary.is_empty() {
        println!("  Summary: {}", article.summary);
    }
    if !article.cover_image.is_empty() {
        println!("  Cover: {}", article.cover_image);
    }
    if !article.source_file.is_empty() {
        println!("  File: {}", article.source_file);
    }
    println!("  Status: {}", article.status.as_str());
    println!("  Updated: {}", article.updated_at);
    println!();
    println!("{}", article.content);
}

async fn create_article(
    config: &AppConfig,
    title: String,
    fields: ArticleFields,
    json: bool,
) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Title must not be empty");
    }

    let patch = patch_from_fields(Some(title), fields, None)?;
    let defaults = NewArticle::default();
    let article = NewArticle {
        title: patch.title.unwrap_or(defaults.title),
        author: patch.author.unwrap_or(defaults.author),
        category: patch.category.unwrap_or(defaults.category),
        summary: patch.summary.unwrap_or(defaults.summary),
        content: patch.content.unwrap_or(defaults.content),
        cover_image: patch.cover_image.unwrap_or(defaults.cover_image),
        ..defaults
    };

    let store = open_store(config).await?;
    let created = store
        .create(article)
        .await
        .context("Failed to create article")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("Created article {} ({})", created.id, created.title);
    }

    Ok(())
}

async fn edit_article(
    config: &AppConfig,
    id: i64,
    title: Option<String>,
    fields: ArticleFields,
    status: Option<String>,
) -> Result<()> {
    let patch = patch_from_fields(title, fields, status.as_deref())?;
    if patch.is_empty() {
        bail!("Nothing to change; pass at least one field");
    }

    let store = open_store(config).await?;
    let Some(updated) = store
        .update(id, &patch)
        .await
        .with_context(|| format!("Failed to update article {}", id))?
    else {
        bail!("Article {} not found", id);
    };

    println!("Updated article {} ({})", updated.id, updated.title);
    Ok(())
}

/// Build a partial update from command-line fields, reading the body file if given
fn patch_from_fields(
    title: Option<String>,
    fields: ArticleFields,
    status: Option<&str>,
) -> Result<ArticlePatch> {
    let content = fields
        .content_file
        .map(|path| {
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .transpose()?;

    let status = match status {
        Some(raw) => match ArticleStatus::parse(raw.trim()) {
            Some(status) => Some(status),
            None => bail!("Invalid status '{}': use draft or published", raw),
        },
        None => None,
    };

    Ok(ArticlePatch {
        title,
        author: fields.author,
        category: fields.category,
        summary: fields.summary,
        content,
        cover_image: fields.cover_image,
        source_file: None,
        status,
    })
}

async fn import_articles(
    config: &AppConfig,
    file: Option<String>,
    articles_dir: Option<PathBuf>,
) -> Result<()> {
    let dir = articles_dir.unwrap_or_else(|| config.general.articles_dir.clone());
    let source = FsArticleSource::new(&dir)
        .with_context(|| format!("Failed to open articles directory {}", dir.display()))?;

    let store = open_store(config).await?;
    let import = ImportArticles::new(Arc::new(source), store);

    let imported = match file {
        Some(file) => vec![
            import
                .import_file(&file)
                .await
                .with_context(|| format!("Failed to import {}", file))?,
        ],
        None => import
            .import_all()
            .await
            .context("Failed to import articles")?,
    };

    println!("Imported {} article(s)", imported.len());
    for article in &imported {
        println!("{:>4}  {}  ({})", article.id, article.title, article.source_file);
    }

    Ok(())
}

async fn delete_article(config: &AppConfig, id: i64) -> Result<()> {
    let store = open_store(config).await?;
    if store.get(id).await?.is_none() {
        bail!("Article {} not found", id);
    }

    store
        .delete(id)
        .await
        .with_context(|| format!("Failed to delete article {}", id))?;
    println!("Deleted article {}", id);

    Ok(())
}
