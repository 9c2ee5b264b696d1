//! SQLite article store and outcome log

use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;
use wechat_publisher_domain::{
    Article, ArticlePatch, ArticleStatus, ArticleStore, NewArticle, PublishAttempt, PublishLog,
    PublishMode, StoreError,
};

type ArticleRow = (
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

const ARTICLE_COLUMNS: &str = "id, title, author, category, summary, content, cover_image, \
     source_file, status, created_at, updated_at";

/// SQLite-backed article store and publish log
pub struct SqliteArticleStore {
    pool: SqlitePool,
}

impl SqliteArticleStore {
    /// Open (or create) the database file and run migrations
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                category TEXT NOT NULL,
                summary TEXT NOT NULL,
                content TEXT NOT NULL,
                cover_image TEXT NOT NULL,
                source_file TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS publish_logs (
                id TEXT PRIMARY KEY,
                article_id INTEGER NOT NULL,
                mode TEXT NOT NULL,
                media_id TEXT NOT NULL,
                result TEXT NOT NULL,
                attempted_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_publish_logs_time
            ON publish_logs(attempted_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

fn format_time(at: OffsetDateTime) -> Result<String, StoreError> {
    at.format(&Rfc3339)
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

fn parse_time(raw: &str) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn article_from_row(row: ArticleRow) -> Result<Article, StoreError> {
    let (
        id,
        title,
        author,
        category,
        summary,
        content,
        cover_image,
        source_file,
        status,
        created_at,
        updated_at,
    ) = row;

    let status = ArticleStatus::parse(&status)
        .ok_or_else(|| StoreError::Serialization(format!("Unknown article status '{}'", status)))?;

    Ok(Article {
        id,
        title,
        author,
        category,
        summary,
        content,
        cover_image,
        source_file,
        status,
        created_at: parse_time(&created_at)?,
        updated_at: parse_time(&updated_at)?,
    })
}

#[async_trait]
impl ArticleStore for SqliteArticleStore {
    async fn get(&self, id: i64) -> Result<Option<Article>, StoreError> {
        let row: Option<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles WHERE id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(article_from_row).transpose()
    }

    async fn update(&self, id: i64, patch: &ArticlePatch) -> Result<Option<Article>, StoreError> {
        // Only patched columns are written; untouched ones keep whatever the row holds now
        let result = sqlx::query(
            r#"
            UPDATE articles SET
                title = COALESCE(?, title),
                author = COALESCE(?, author),
                category = COALESCE(?, category),
                summary = COALESCE(?, summary),
                content = COALESCE(?, content),
                cover_image = COALESCE(?, cover_image),
                source_file = COALESCE(?, source_file),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(patch.title.as_deref())
        .bind(patch.author.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.summary.as_deref())
        .bind(patch.content.as_deref())
        .bind(patch.cover_image.as_deref())
        .bind(patch.source_file.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(format_time(OffsetDateTime::now_utc())?)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    async fn create(&self, article: NewArticle) -> Result<Article, StoreError> {
        let now = OffsetDateTime::now_utc();
        let now_str = format_time(now)?;

        let result = sqlx::query(
            r#"
            INSERT INTO articles
            (title, author, category, summary, content, cover_image, source_file, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.author)
        .bind(&article.category)
        .bind(&article.summary)
        .bind(&article.content)
        .bind(&article.cover_image)
        .bind(&article.source_file)
        .bind(article.status.as_str())
        .bind(&now_str)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(article.into_article(result.last_insert_rowid(), now))
    }

    async fn list(&self) -> Result<Vec<Article>, StoreError> {
        let rows: Vec<ArticleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM articles ORDER BY updated_at DESC, id DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(article_from_row).collect()
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl PublishLog for SqliteArticleStore {
    async fn append(&self, attempt: &PublishAttempt) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO publish_logs (id, article_id, mode, media_id, result, attempted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(attempt.id.to_string())
        .bind(attempt.article_id)
        .bind(attempt.mode.as_str())
        .bind(&attempt.media_id)
        .bind(&attempt.result)
        .bind(format_time(attempt.attempted_at)?)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PublishAttempt>, StoreError> {
        let rows: Vec<(String, i64, String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT id, article_id, mode, media_id, result, attempted_at
            FROM publish_logs
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(id, article_id, mode, media_id, result, attempted_at)| {
                Ok(PublishAttempt {
                    id: Uuid::parse_str(&id)
                        .map_err(|e| StoreError::Serialization(e.to_string()))?,
                    article_id,
                    mode: PublishMode::parse(&mode).ok_or_else(|| {
                        StoreError::Serialization(format!("Unknown publish mode '{}'", mode))
                    })?,
                    media_id,
                    result,
                    attempted_at: parse_time(&attempted_at)?,
                })
            })
            .collect()
    }
}
