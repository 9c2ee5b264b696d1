//! In-memory article store and outcome log for testing and dry runs

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};
use time::OffsetDateTime;
use wechat_publisher_domain::{
    Article, ArticlePatch, ArticleStore, NewArticle, PublishAttempt, PublishLog, StoreError,
};

/// In-memory store implementation
pub struct InMemoryArticleStore {
    articles: RwLock<BTreeMap<i64, Article>>,
    attempts: RwLock<Vec<PublishAttempt>>,
    next_id: AtomicI64,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(BTreeMap::new()),
            attempts: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn get(&self, id: i64) -> Result<Option<Article>, StoreError> {
        let articles = self
            .articles
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(articles.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: &ArticlePatch) -> Result<Option<Article>, StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(articles.get_mut(&id).map(|article| {
            patch.apply(article, OffsetDateTime::now_utc());
            article.clone()
        }))
    }

    async fn create(&self, article: NewArticle) -> Result<Article, StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        // Ids are never reused, even after a delete
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let article = article.into_article(id, OffsetDateTime::now_utc());
        articles.insert(id, article.clone());
        Ok(article)
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let articles = self
            .articles
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let mut all: Vec<Article> = articles.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut articles = self
            .articles
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        articles.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl PublishLog for InMemoryArticleStore {
    async fn append(&self, attempt: &PublishAttempt) -> Result<(), StoreError> {
        let mut attempts = self
            .attempts
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        attempts.push(attempt.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PublishAttempt>, StoreError> {
        let attempts = self
            .attempts
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(attempts.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wechat_publisher_domain::{ArticleStatus, PublishMode};

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = InMemoryArticleStore::new();

        let a = store.create(NewArticle::default()).await.unwrap();
        let b = store.create(NewArticle::default()).await.unwrap();
        store.delete(b.id).await.unwrap();
        let c = store.create(NewArticle::default()).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 3);
        assert_eq!(a.title, "Untitled");
    }

    #[tokio::test]
    async fn test_update_and_missing() {
        let store = InMemoryArticleStore::new();
        let created = store.create(NewArticle::default()).await.unwrap();

        let patch = ArticlePatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = store.update(created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.status, ArticleStatus::Draft);

        assert!(store.update(99, &patch).await.unwrap().is_none());
        store.delete(99).await.unwrap();
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let store = InMemoryArticleStore::new();
        let now = OffsetDateTime::now_utc();

        store
            .append(&PublishAttempt::failed(1, "boom".to_string(), now))
            .await
            .unwrap();
        store
            .append(&PublishAttempt::succeeded(
                1,
                PublishMode::Publish,
                "m".to_string(),
                now,
            ))
            .await
            .unwrap();

        let recent = store.recent(50).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].is_success());
        assert_eq!(recent[1].result, "boom");

        assert_eq!(store.recent(1).await.unwrap().len(), 1);
    }
}
