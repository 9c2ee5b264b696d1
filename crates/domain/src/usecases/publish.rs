//! Publish use case - converts a stored article and pushes it to the platform

use std::sync::Arc;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::{
    markup,
    model::{
        Article, ArticlePatch, ArticleStatus, DraftArticle, PublishAttempt, PublishMode,
        PublishOutcome,
    },
    ports::{
        ArticleStore, AuthError, Clock, Platform, PlatformError, PublishLog, StoreError,
        TokenProvider, VcsError, VersionControl,
    },
};

/// Auto-commit side effect settings
#[derive(Debug, Clone)]
pub struct AutoCommitConfig {
    /// Commit message, `{date}` is replaced with `YYYY-MM-DD HH:MM`
    pub message_template: String,
    /// Push after a successful commit
    pub push: bool,
    pub remote: String,
    pub branch: Option<String>,
}

impl Default for AutoCommitConfig {
    fn default() -> Self {
        Self {
            message_template: "Update: {date}".to_string(),
            push: false,
            remote: "origin".to_string(),
            branch: None,
        }
    }
}

/// Configuration for the publish workflow
#[derive(Debug, Clone, Default)]
pub struct PublishConfig {
    /// Cover media id used when the article has none
    pub default_cover_media_id: Option<String>,
    /// Commit (and maybe push) after each successful publish
    pub auto_commit: Option<AutoCommitConfig>,
}

/// Errors surfaced by [`PublishWorkflow::publish`]
#[derive(Debug, thiserror::Error)]
pub enum PublishWorkflowError {
    #[error("Article {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl PublishWorkflowError {
    /// Text recorded as the attempt result; platform text is kept verbatim
    pub fn detail(&self) -> String {
        match self {
            Self::Auth(e) => e.detail(),
            Self::Platform(e) => e.detail(),
            other => other.to_string(),
        }
    }
}

/// Publish workflow orchestrator
pub struct PublishWorkflow<S, L, T, P, V, Cl>
where
    S: ArticleStore + ?Sized,
    L: PublishLog + ?Sized,
    T: TokenProvider + ?Sized,
    P: Platform + ?Sized,
    V: VersionControl + ?Sized,
    Cl: Clock + ?Sized,
{
    store: Arc<S>,
    log: Arc<L>,
    tokens: Arc<T>,
    platform: Arc<P>,
    vcs: Arc<V>,
    clock: Arc<Cl>,
    config: PublishConfig,
}

impl<S, L, T, P, V, Cl> PublishWorkflow<S, L, T, P, V, Cl>
where
    S: ArticleStore + ?Sized,
    L: PublishLog + ?Sized,
    T: TokenProvider + ?Sized,
    P: Platform + ?Sized,
    V: VersionControl + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        store: Arc<S>,
        log: Arc<L>,
        tokens: Arc<T>,
        platform: Arc<P>,
        vcs: Arc<V>,
        clock: Arc<Cl>,
        config: PublishConfig,
    ) -> Self {
        Self {
            store,
            log,
            tokens,
            platform,
            vcs,
            clock,
            config,
        }
    }

    /// Publish one article. `draft_mode` stops after draft creation.
    ///
    /// Every call that finds its article appends exactly one attempt to the
    /// outcome log. The article is marked published only on success.
    pub async fn publish(
        &self,
        article_id: i64,
        draft_mode: bool,
    ) -> Result<PublishOutcome, PublishWorkflowError> {
        let article = self
            .store
            .get(article_id)
            .await?
            .ok_or(PublishWorkflowError::NotFound(article_id))?;

        tracing::info!(
            article_id,
            title = %article.title,
            draft_mode,
            "Publishing article"
        );

        let outcome = match self.push_to_platform(&article, draft_mode).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(article_id, error = %error, "Publish failed");
                let attempt = PublishAttempt::failed(article_id, error.detail(), self.clock.now());
                if let Err(log_error) = self.log.append(&attempt).await {
                    tracing::error!(
                        article_id,
                        error = %log_error,
                        "Failed to record publish attempt"
                    );
                }
                return Err(error);
            }
        };

        let attempt = PublishAttempt::succeeded(
            article_id,
            outcome.mode,
            outcome.media_id.clone(),
            self.clock.now(),
        );
        // Logged before the status moves, so a published article always has a success row
        self.log.append(&attempt).await?;

        if self
            .store
            .update(article_id, &ArticlePatch::status(ArticleStatus::Published))
            .await?
            .is_none()
        {
            tracing::warn!(article_id, "Article disappeared before status update");
        }

        tracing::info!(
            article_id,
            media_id = %outcome.media_id,
            mode = outcome.mode.as_str(),
            "Article published"
        );

        if let Some(auto_commit) = &self.config.auto_commit {
            if let Err(e) = self.commit_changes(auto_commit).await {
                tracing::warn!(error = %e, "Auto-commit failed");
            }
        }

        Ok(outcome)
    }

    async fn push_to_platform(
        &self,
        article: &Article,
        draft_mode: bool,
    ) -> Result<PublishOutcome, PublishWorkflowError> {
        let credential = self.tokens.fetch_token().await?;
        tracing::debug!(article_id = article.id, "Obtained access token");

        let content_html = markup::to_wechat_html(&article.content);
        let draft = DraftArticle::assemble(article, &content_html, self.resolve_cover(article));

        let media_id = self.platform.create_draft(&credential, &draft).await?;
        tracing::info!(article_id = article.id, media_id = %media_id, "Draft created");

        if draft_mode {
            return Ok(PublishOutcome {
                media_id,
                mode: PublishMode::Draft,
            });
        }

        self.platform.submit_publish(&credential, &media_id).await?;

        Ok(PublishOutcome {
            media_id,
            mode: PublishMode::Publish,
        })
    }

    /// Article cover, else the configured default, else empty
    fn resolve_cover(&self, article: &Article) -> String {
        let own = article.cover_image.trim();
        if !own.is_empty() {
            return own.to_string();
        }

        match self.config.default_cover_media_id.as_deref().map(str::trim) {
            Some(default) if !default.is_empty() => default.to_string(),
            _ => {
                tracing::warn!(article_id = article.id, "No cover media id available");
                String::new()
            }
        }
    }

    async fn commit_changes(&self, config: &AutoCommitConfig) -> Result<(), VcsError> {
        let message = render_commit_message(&config.message_template, self.clock.now());
        let outcome = self.vcs.stage_and_commit(&message).await?;
        tracing::info!(
            committed = outcome.committed,
            detail = %outcome.detail,
            "Auto-commit finished"
        );

        if config.push {
            let output = self.vcs.push(&config.remote, config.branch.as_deref()).await?;
            tracing::info!(remote = %config.remote, output = %output.trim(), "Pushed changes");
        }

        Ok(())
    }
}

/// Substitute `{date}` in a commit message template
pub fn render_commit_message(template: &str, now: OffsetDateTime) -> String {
    let date = now
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default();
    template.replace("{date}", &date)
}
