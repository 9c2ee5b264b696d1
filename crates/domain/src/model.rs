//! Domain models and value objects

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle status of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// Editable, not yet pushed to the platform
    #[default]
    Draft,
    /// Successfully sent to the platform at least once
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }
}

/// A stored article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub summary: String,
    /// Markdown body
    pub content: String,
    /// Cover reference (platform media id), empty when unset
    pub cover_image: String,
    /// File the article was imported from, empty when created elsewhere
    pub source_file: String,
    pub status: ArticleStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Input for creating an article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub category: String,
    pub summary: String,
    pub content: String,
    pub cover_image: String,
    pub source_file: String,
    pub status: ArticleStatus,
}

impl Default for NewArticle {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            author: "Anonymous".to_string(),
            category: "Uncategorized".to_string(),
            summary: String::new(),
            content: String::new(),
            cover_image: String::new(),
            source_file: String::new(),
            status: ArticleStatus::Draft,
        }
    }
}

impl NewArticle {
    /// Materialize into a stored article with the given id and timestamp
    pub fn into_article(self, id: i64, now: OffsetDateTime) -> Article {
        Article {
            id,
            title: self.title,
            author: self.author,
            category: self.category,
            summary: self.summary,
            content: self.content,
            cover_image: self.cover_image,
            source_file: self.source_file,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an article. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub source_file: Option<String>,
    pub status: Option<ArticleStatus>,
}

impl ArticlePatch {
    /// Patch that only moves the article to a new status
    pub fn status(status: ArticleStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.category.is_none()
            && self.summary.is_none()
            && self.content.is_none()
            && self.cover_image.is_none()
            && self.source_file.is_none()
            && self.status.is_none()
    }

    /// Merge the patch into `article`, bumping `updated_at`
    pub fn apply(&self, article: &mut Article, now: OffsetDateTime) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(author) = &self.author {
            article.author = author.clone();
        }
        if let Some(category) = &self.category {
            article.category = category.clone();
        }
        if let Some(summary) = &self.summary {
            article.summary = summary.clone();
        }
        if let Some(content) = &self.content {
            article.content = content.clone();
        }
        if let Some(cover_image) = &self.cover_image {
            article.cover_image = cover_image.clone();
        }
        if let Some(source_file) = &self.source_file {
            article.source_file = source_file.clone();
        }
        if let Some(status) = self.status {
            article.status = status;
        }
        article.updated_at = now;
    }
}

/// How far a publish attempt went on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    /// Draft box only, awaiting manual review
    Draft,
    /// Draft created and submitted for publication
    Publish,
}

impl PublishMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "publish" => Some(Self::Publish),
            _ => None,
        }
    }
}

/// Outcome log entry, one per publish invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishAttempt {
    pub id: Uuid,
    pub article_id: i64,
    pub mode: PublishMode,
    /// Platform media id, empty on failure
    pub media_id: String,
    /// `"success"` or the error detail
    pub result: String,
    #[serde(with = "time::serde::rfc3339")]
    pub attempted_at: OffsetDateTime,
}

impl PublishAttempt {
    pub const SUCCESS: &'static str = "success";

    pub fn succeeded(
        article_id: i64,
        mode: PublishMode,
        media_id: String,
        attempted_at: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            article_id,
            mode,
            media_id,
            result: Self::SUCCESS.to_string(),
            attempted_at,
        }
    }

    /// Failed attempts are always recorded in draft mode with no media id
    pub fn failed(article_id: i64, detail: String, attempted_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            article_id,
            mode: PublishMode::Draft,
            media_id: String::new(),
            result: detail,
            attempted_at,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result == Self::SUCCESS
    }
}

/// Platform access token, valid for one workflow invocation
#[derive(Debug, Clone)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Crop hint sent for both thumbnail aspect ratios
pub const FULL_CROP: &str = "0_0_1_1";

/// Platform hard limits, in code points
pub const TITLE_LIMIT: usize = 20;
pub const AUTHOR_LIMIT: usize = 5;
pub const CONTENT_LIMIT: usize = 20_000;
pub const DIGEST_LIMIT: usize = 20;

/// One entry of a draft-creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftArticle {
    pub title: String,
    pub author: String,
    pub content: String,
    pub digest: String,
    pub content_source_url: String,
    pub thumb_media_id: String,
    pub pic_crop_235_1: String,
    pub pic_crop_1_1: String,
}

impl DraftArticle {
    /// Build the payload, silently cutting every field to the platform limit
    pub fn assemble(article: &Article, content_html: &str, thumb_media_id: String) -> Self {
        Self {
            title: truncate_chars(&article.title, TITLE_LIMIT),
            author: truncate_chars(&article.author, AUTHOR_LIMIT),
            content: truncate_chars(content_html, CONTENT_LIMIT),
            digest: truncate_chars(&article.summary, DIGEST_LIMIT),
            content_source_url: String::new(),
            thumb_media_id,
            pic_crop_235_1: FULL_CROP.to_string(),
            pic_crop_1_1: FULL_CROP.to_string(),
        }
    }
}

/// Keep the first `max` code points of `value`
pub fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

/// Successful result of the publish workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub media_id: String,
    pub mode: PublishMode,
}

/// Schedule trigger mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    #[default]
    Cron,
    Interval,
}

/// Scheduler configuration, read once at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub mode: ScheduleMode,
    pub cron: String,
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: ScheduleMode::Cron,
            cron: "0 9 * * *".to_string(),
            interval_minutes: 30,
        }
    }
}

/// Result of a successful stage + commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// False when the working tree was already clean
    pub committed: bool,
    pub detail: String,
}
