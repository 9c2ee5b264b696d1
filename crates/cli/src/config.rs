//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wechat_publisher_domain::{ScheduleConfig, ScheduleMode};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub wechat: WechatConfig,

    #[serde(default)]
    pub publish: PublishSection,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub schedule: ScheduleSection,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_articles_dir")]
    pub articles_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WechatConfig {
    #[serde(default)]
    pub app_id: String,

    /// Name of the env var holding the app secret
    #[serde(default = "default_app_secret_env")]
    pub app_secret_env: String,

    #[serde(default)]
    pub default_cover_media_id: String,

    #[serde(default = "default_wechat_base_url")]
    pub base_url: String,

    #[serde(default = "default_wechat_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSection {
    /// Stop after draft creation unless `--publish` is given
    #[serde(default = "default_true")]
    pub draft_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    #[serde(default)]
    pub auto_commit: bool,

    #[serde(default)]
    pub auto_push: bool,

    #[serde(default = "default_commit_message_template")]
    pub commit_message_template: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub branch: String,

    #[serde(default = "default_repo_path")]
    pub repo_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub mode: ScheduleMode,

    #[serde(default = "default_cron")]
    pub cron: String,

    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Env var holding the shared secret; unset or empty skips verification
    #[serde(default = "default_webhook_secret_env")]
    pub secret_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// glm, minimax, qwen or stub
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Empty means the provider default
    #[serde(default)]
    pub model: String,

    /// Empty means `<PROVIDER>_API_KEY`
    #[serde(default)]
    pub api_key_env: String,

    /// Empty means the provider default
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

// Default value functions
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/publisher.db")
}

fn default_articles_dir() -> PathBuf {
    PathBuf::from("./articles")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_app_secret_env() -> String {
    "WECHAT_APP_SECRET".to_string()
}

fn default_wechat_base_url() -> String {
    "https://api.weixin.qq.com".to_string()
}

fn default_wechat_timeout() -> u64 {
    30
}

fn default_commit_message_template() -> String {
    "Update: {date}".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_repo_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_cron() -> String {
    "0 9 * * *".to_string()
}

fn default_interval_minutes() -> u64 {
    30
}

fn default_webhook_secret_env() -> String {
    "GITHUB_WEBHOOK_SECRET".to_string()
}

fn default_provider() -> String {
    "glm".to_string()
}

fn default_ai_timeout() -> u64 {
    120
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            articles_dir: default_articles_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for WechatConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret_env: default_app_secret_env(),
            default_cover_media_id: String::new(),
            base_url: default_wechat_base_url(),
            timeout_secs: default_wechat_timeout(),
        }
    }
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            draft_mode: default_true(),
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            auto_commit: false,
            auto_push: false,
            commit_message_template: default_commit_message_template(),
            remote: default_remote(),
            branch: String::new(),
            repo_path: default_repo_path(),
        }
    }
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: ScheduleMode::default(),
            cron: default_cron(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret_env: default_webhook_secret_env(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            api_key_env: String::new(),
            base_url: String::new(),
            timeout_secs: default_ai_timeout(),
            temperature: default_temperature(),
        }
    }
}

impl ScheduleSection {
    pub fn to_domain(&self) -> ScheduleConfig {
        ScheduleConfig {
            enabled: self.enabled,
            mode: self.mode,
            cron: self.cron.clone(),
            interval_minutes: self.interval_minutes,
        }
    }
}

impl AiConfig {
    /// Env var holding the provider API key
    pub fn api_key_env(&self) -> String {
        if self.api_key_env.trim().is_empty() {
            format!("{}_API_KEY", self.provider.to_uppercase())
        } else {
            self.api_key_env.clone()
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("WECHAT_PUBLISHER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# wechat-publisher configuration

[general]
db_path = "./data/publisher.db"
articles_dir = "./articles"
log_level = "info"

[wechat]
app_id = "wx0000000000000000"
# The secret itself is read from this environment variable
app_secret_env = "WECHAT_APP_SECRET"
# Cover used when an article has none
default_cover_media_id = ""
base_url = "https://api.weixin.qq.com"
timeout_secs = 30

[publish]
# true: stop after creating the draft; pass --publish to submit
draft_mode = true

[git]
auto_commit = false
auto_push = false
# {date} becomes YYYY-MM-DD HH:MM (UTC)
commit_message_template = "Update: {date}"
remote = "origin"
branch = ""
repo_path = "."

[schedule]
enabled = false
mode = "cron"  # cron, interval
cron = "0 9 * * *"
interval_minutes = 30

[ai]
provider = "glm"  # glm, minimax, qwen, stub
# model = "glm-4-flash"
# api_key_env = "GLM_API_KEY"
# base_url = ""
timeout_secs = 120
temperature = 0.7

[webhook]
# Shared secret for X-Hub-Signature-256; leave the variable unset to skip checks
secret_env = "GITHUB_WEBHOOK_SECRET"
"#
        .to_string()
    }
}
