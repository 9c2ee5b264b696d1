//! Article generation use case

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::{
    model::{Article, NewArticle},
    ports::{ArticleStore, GenerateError, StoreError, TextGenerator},
};

static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("Valid regex"));

/// Title used when neither the output nor the request provides one
pub const FALLBACK_TITLE: &str = "AI 生成文章";

/// Characters of generated content kept as the summary
pub const SUMMARY_CHARS: usize = 200;

/// Target article length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ArticleLength {
    /// Accepts English names and the Chinese labels 短 / 中等 / 长
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "short" | "短" => Some(Self::Short),
            "medium" | "中等" => Some(Self::Medium),
            "long" | "长" => Some(Self::Long),
            _ => None,
        }
    }

    fn word_range(&self) -> &'static str {
        match self {
            Self::Short => "500-800 字",
            Self::Medium => "1000-1500 字",
            Self::Long => "2000-3000 字",
        }
    }
}

/// What to write about
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub keyword: String,
    pub style: String,
    pub length: ArticleLength,
    pub title: Option<String>,
}

impl GenerateRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            style: "技术文章".to_string(),
            length: ArticleLength::default(),
            title: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateArticleError {
    #[error("Keyword must not be empty")]
    EmptyKeyword,
    #[error("Generated content is empty")]
    EmptyContent,
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Build the provider prompt for a request
pub fn build_prompt(request: &GenerateRequest) -> String {
    let title = request
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("请根据关键词生成");

    format!(
        "请根据以下关键词生成一篇适合微信公众号发布的文章。

关键词: {keyword}
文章标题: {title}
文章风格: {style}
文章长度: {length}

要求:
1. 文章格式为 Markdown
2. 开头要有吸引人的引言
3. 结构清晰，有多个小标题
4. 内容专业但不晦涩
5. 适合手机阅读
6. 可以添加适度的表情符号增加趣味性

请生成完整的文章内容。",
        keyword = request.keyword,
        style = request.style,
        length = request.length.word_range(),
    )
}

/// First `# ` heading in `content`, trimmed
pub fn extract_title(content: &str) -> Option<String> {
    TITLE_LINE
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Generates markdown articles and optionally stores them as drafts
pub struct GenerateArticle<G, S>
where
    G: TextGenerator + ?Sized,
    S: ArticleStore + ?Sized,
{
    generator: Arc<G>,
    store: Arc<S>,
}

impl<G, S> GenerateArticle<G, S>
where
    G: TextGenerator + ?Sized,
    S: ArticleStore + ?Sized,
{
    pub fn new(generator: Arc<G>, store: Arc<S>) -> Self {
        Self { generator, store }
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateArticleError> {
        if request.keyword.trim().is_empty() {
            return Err(GenerateArticleError::EmptyKeyword);
        }

        tracing::info!(
            provider = self.generator.provider(),
            keyword = %request.keyword,
            length = ?request.length,
            "Generating article"
        );

        let content = self.generator.generate(&build_prompt(request)).await?;

        tracing::debug!(chars = content.chars().count(), "Generation finished");
        Ok(content)
    }

    /// Store generated content as a draft article.
    ///
    /// The title comes from the first heading of the content, then the
    /// requested title, then the keyword.
    pub async fn save(
        &self,
        content: &str,
        keyword: &str,
        title: Option<&str>,
    ) -> Result<Article, GenerateArticleError> {
        if content.trim().is_empty() {
            return Err(GenerateArticleError::EmptyContent);
        }

        let title = extract_title(content)
            .or_else(|| title.map(str::to_string).filter(|t| !t.is_empty()))
            .or_else(|| Some(keyword.to_string()).filter(|k| !k.is_empty()))
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        let article = self
            .store
            .create(NewArticle {
                title,
                summary: content.chars().take(SUMMARY_CHARS).collect(),
                content: content.to_string(),
                ..Default::default()
            })
            .await?;

        tracing::info!(article_id = article.id, title = %article.title, "Saved generated article");
        Ok(article)
    }
}
