//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// wechat-publisher: publish markdown articles to a WeChat Official Account
#[derive(Parser, Debug)]
#[command(name = "wechat-publisher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish a stored article
    Publish(PublishArgs),

    /// Import a markdown file and publish it in one step
    PublishFile(PublishFileArgs),

    /// Manage stored articles
    Articles(ArticlesArgs),

    /// Show recent publish attempts
    Logs(LogsArgs),

    /// Run or inspect the background scheduler
    Schedule(ScheduleArgs),

    /// Generate an article with a text generation provider
    Generate(GenerateArgs),

    /// Inspect the content repository
    Git(GitArgs),

    /// Check a repository webhook delivery
    Webhook(WebhookArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Article id
    pub id: i64,

    /// Submit for publication instead of stopping at the draft
    #[arg(short, long)]
    pub publish: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PublishFileArgs {
    /// File name inside the articles directory (default: most recently modified)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Submit for publication instead of stopping at the draft
    #[arg(short, long)]
    pub publish: bool,

    /// Override articles directory
    #[arg(long)]
    pub articles_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ArticlesArgs {
    #[command(subcommand)]
    pub command: ArticlesCommands,
}

#[derive(Subcommand, Debug)]
pub enum ArticlesCommands {
    /// List stored articles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one article
    Show {
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an article
    Create {
        #[arg(long)]
        title: String,

        #[command(flatten)]
        fields: ArticleFields,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an article; omitted fields are left alone
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: ArticleFields,

        /// draft or published
        #[arg(long)]
        status: Option<String>,
    },

    /// Import markdown files from the articles directory
    Import {
        /// Import a single file instead of the whole directory
        #[arg(short, long)]
        file: Option<String>,

        /// Override articles directory
        #[arg(long)]
        articles_dir: Option<PathBuf>,
    },

    /// Delete an article
    Delete { id: i64 },
}

#[derive(Args, Debug, Default)]
pub struct ArticleFields {
    #[arg(long)]
    pub author: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub summary: Option<String>,

    /// Cover media id
    #[arg(long)]
    pub cover_image: Option<String>,

    /// Read the markdown body from this file
    #[arg(long)]
    pub content_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Number of entries to show
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// Start the scheduler and run until Ctrl-C
    Run,

    /// Show the configured schedule and its next run time
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Topic keyword
    #[arg(short, long)]
    pub keyword: String,

    /// Writing style
    #[arg(long, default_value = "技术文章")]
    pub style: String,

    /// Length: short, medium, long (or 短, 中等, 长)
    #[arg(long, default_value = "medium")]
    pub length: String,

    /// Desired title
    #[arg(long)]
    pub title: Option<String>,

    /// Store the result as a draft article
    #[arg(long)]
    pub save: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GitArgs {
    #[command(subcommand)]
    pub command: GitCommands,
}

#[derive(Subcommand, Debug)]
pub enum GitCommands {
    /// Changed files and current branch
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recent commits
    Log {
        /// Number of commits to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct WebhookArgs {
    #[command(subcommand)]
    pub command: WebhookCommands,
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommands {
    /// Verify a saved delivery body against its signature header
    Verify {
        /// Raw request body
        #[arg(long)]
        payload_file: PathBuf,

        /// Value of the X-Hub-Signature-256 header
        #[arg(long)]
        signature: Option<String>,

        /// Value of the X-GitHub-Event header
        #[arg(long, default_value = "push")]
        event: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration after env overrides
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
