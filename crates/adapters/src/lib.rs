//! wechat-publisher adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `wechat`: WeChat Official Account API (tokens, drafts, publishing)
//! - `store`: SQLite and in-memory article stores / outcome logs
//! - `source`: Filesystem markdown article source
//! - `git`: Version control through the `git` binary
//! - `llm`: Text generation providers (GLM, MiniMax, Qwen, stub)

pub mod git;
pub mod llm;
mod markdown_fs;
mod store_memory;
mod store_sqlite;
pub mod wechat;

/// Re-exports for store adapters
pub mod store {
    pub use crate::store_memory::InMemoryArticleStore;
    pub use crate::store_sqlite::SqliteArticleStore;
}

/// Re-exports for article source adapters
pub mod source {
    pub use crate::markdown_fs::FsArticleSource;
}
