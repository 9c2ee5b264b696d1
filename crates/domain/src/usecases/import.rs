//! Import use case - copies markdown articles from a source into the store
//!
//! Articles are matched on `source_file`, so importing the same file twice
//! refreshes the stored copy instead of creating a duplicate.

use std::sync::Arc;

use crate::{
    model::{Article, ArticlePatch, NewArticle},
    ports::{ArticleSource, ArticleStore, ImportError, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum ImportArticlesError {
    #[error(transparent)]
    Source(#[from] ImportError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("No markdown articles found")]
    Empty,
}

pub struct ImportArticles<Src, S>
where
    Src: ArticleSource + ?Sized,
    S: ArticleStore + ?Sized,
{
    source: Arc<Src>,
    store: Arc<S>,
}

impl<Src, S> ImportArticles<Src, S>
where
    Src: ArticleSource + ?Sized,
    S: ArticleStore + ?Sized,
{
    pub fn new(source: Arc<Src>, store: Arc<S>) -> Self {
        Self { source, store }
    }

    /// Import one file by name
    pub async fn import_file(&self, file_name: &str) -> Result<Article, ImportArticlesError> {
        let article = self.source.load(file_name).await?;
        self.upsert(article).await
    }

    /// Import the most recently modified file
    pub async fn import_latest(&self) -> Result<Article, ImportArticlesError> {
        let article = self
            .source
            .latest()
            .await?
            .ok_or(ImportArticlesError::Empty)?;
        self.upsert(article).await
    }

    /// Import every file in the source
    pub async fn import_all(&self) -> Result<Vec<Article>, ImportArticlesError> {
        let mut imported = Vec::new();
        for article in self.source.load_all().await? {
            imported.push(self.upsert(article).await?);
        }

        tracing::info!(count = imported.len(), "Imported articles");
        Ok(imported)
    }

    async fn upsert(&self, article: NewArticle) -> Result<Article, ImportArticlesError> {
        let existing = if article.source_file.is_empty() {
            None
        } else {
            self.store
                .list()
                .await?
                .into_iter()
                .find(|a| a.source_file == article.source_file)
        };

        let Some(existing) = existing else {
            let created = self.store.create(article).await?;
            tracing::info!(article_id = created.id, source_file = %created.source_file, "Imported new article");
            return Ok(created);
        };

        // Status is left alone so a re-import never un-publishes
        let patch = ArticlePatch {
            title: Some(article.title),
            author: Some(article.author),
            category: Some(article.category),
            summary: Some(article.summary),
            content: Some(article.content),
            cover_image: Some(article.cover_image),
            ..Default::default()
        };

        let updated = self
            .store
            .update(existing.id, &patch)
            .await?
            .unwrap_or(existing);

        tracing::info!(article_id = updated.id, source_file = %updated.source_file, "Refreshed imported article");
        Ok(updated)
    }
}
