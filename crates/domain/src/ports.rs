//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{
    Article, ArticlePatch, CommitOutcome, Credential, DraftArticle, NewArticle, PublishAttempt,
};

/// Error type for article store and outcome log operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for persistent article storage
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetch one article
    async fn get(&self, id: i64) -> Result<Option<Article>, StoreError>;

    /// Apply a partial update, returning the updated article or `None` if absent
    async fn update(&self, id: i64, patch: &ArticlePatch) -> Result<Option<Article>, StoreError>;

    /// Insert a new article and return it with its assigned id
    async fn create(&self, article: NewArticle) -> Result<Article, StoreError>;

    /// All articles, most recently updated first
    async fn list(&self) -> Result<Vec<Article>, StoreError>;

    /// Remove an article. Removing a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// Port for the append-only outcome log
#[async_trait]
pub trait PublishLog: Send + Sync {
    /// Append one attempt
    async fn append(&self, attempt: &PublishAttempt) -> Result<(), StoreError>;

    /// Most recent attempts, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<PublishAttempt>, StoreError>;
}

/// Error type for reading articles from a content source
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Article file not found: {0}")]
    NotFound(String),
    #[error("Invalid article file name: {0}")]
    InvalidName(String),
}

/// Port for a directory of markdown articles
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Every article in the source, ordered by file name
    async fn load_all(&self) -> Result<Vec<NewArticle>, ImportError>;

    /// One article by file name, relative to the source root
    async fn load(&self, file_name: &str) -> Result<NewArticle, ImportError>;

    /// The most recently modified article, `None` when the source is empty
    async fn latest(&self) -> Result<Option<NewArticle>, ImportError>;
}

/// Error type for credential acquisition
#[derive(Debug, Error)]
pub enum AuthError {
    /// The platform answered but without a token; carries the raw body
    #[error("Failed to obtain access token: {body}")]
    MissingToken { body: String },
    #[error("Network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Text recorded in the outcome log
    pub fn detail(&self) -> String {
        match self {
            Self::MissingToken { body } => body.clone(),
            Self::Network(message) => message.clone(),
        }
    }
}

/// Port for acquiring a fresh platform credential
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<Credential, AuthError>;
}

/// Error type for platform draft/publish calls
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Draft creation returned no media id; carries the platform message
    #[error("Failed to create draft: {0}")]
    DraftRejected(String),
    /// Publish submission returned a non-zero errcode
    #[error("Failed to publish: {message} (errcode {code})")]
    PublishRejected { code: i64, message: String },
    #[error("Network error: {0}")]
    Network(String),
}

impl PlatformError {
    /// Platform message, passed through verbatim
    pub fn detail(&self) -> String {
        match self {
            Self::DraftRejected(message) => message.clone(),
            Self::PublishRejected { message, .. } => message.clone(),
            Self::Network(message) => message.clone(),
        }
    }
}

/// Port for the content platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Create a draft, returning its media id
    async fn create_draft(
        &self,
        credential: &Credential,
        draft: &DraftArticle,
    ) -> Result<String, PlatformError>;

    /// Submit an existing draft for publication
    async fn submit_publish(
        &self,
        credential: &Credential,
        media_id: &str,
    ) -> Result<(), PlatformError>;
}

/// Error type for version-control side effects
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("Failed to run git: {0}")]
    Spawn(String),
    #[error("git {command} failed: {stderr}")]
    Command { command: String, stderr: String },
}

/// Port for the version-control helper
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Stage everything and commit with `message`
    async fn stage_and_commit(&self, message: &str) -> Result<CommitOutcome, VcsError>;

    /// Push to `remote`, optionally a specific branch
    async fn push(&self, remote: &str, branch: Option<&str>) -> Result<String, VcsError>;
}

/// Error type for text generation
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Timeout")]
    Timeout,
}

/// Port for generative text providers
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

    /// Provider name (e.g., "glm", "qwen")
    fn provider(&self) -> &'static str;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
