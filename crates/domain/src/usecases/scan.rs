//! Scheduled content scan - finds articles still waiting to be published

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    model::{Article, ArticleStatus},
    ports::{ArticleStore, StoreError},
    usecases::scheduler::{ScheduledJob, SchedulerError},
};

/// Job id reported by the scheduler
pub const PUBLISH_CHECK_JOB: &str = "publish_check";

/// Enumerates draft articles. Reports only; never publishes.
pub struct ScanPendingArticles<S: ArticleStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ArticleStore + ?Sized> ScanPendingArticles<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn scan(&self) -> Result<Vec<Article>, StoreError> {
        let pending: Vec<Article> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|a| a.status == ArticleStatus::Draft)
            .collect();

        tracing::info!(
            count = pending.len(),
            ids = ?pending.iter().map(|a| a.id).collect::<Vec<_>>(),
            "Pending articles"
        );

        Ok(pending)
    }
}

#[async_trait]
impl<S: ArticleStore + ?Sized> ScheduledJob for ScanPendingArticles<S> {
    fn id(&self) -> &str {
        PUBLISH_CHECK_JOB
    }

    async fn run(&self) -> Result<(), SchedulerError> {
        self.scan()
            .await
            .map(|_| ())
            .map_err(|e| SchedulerError::Job(e.to_string()))
    }
}
