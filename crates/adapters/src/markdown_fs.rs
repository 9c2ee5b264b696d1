//! Filesystem-based markdown article source

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use wechat_publisher_domain::{ArticleSource, ImportError, NewArticle};

/// Directory of `.md` files with optional `---` frontmatter
pub struct FsArticleSource {
    articles_dir: PathBuf,
    name_pattern: Regex,
}

impl FsArticleSource {
    pub fn new(articles_dir: impl AsRef<Path>) -> Result<Self, ImportError> {
        let articles_dir = articles_dir.as_ref().to_path_buf();

        if !articles_dir.is_dir() {
            return Err(ImportError::NotFound(articles_dir.display().to_string()));
        }

        // A bare file name, never a path
        let name_pattern = Regex::new(r"^[^/\\]+\.md$").expect("Valid regex");

        Ok(Self {
            articles_dir,
            name_pattern,
        })
    }

    fn markdown_files(&self) -> Result<Vec<PathBuf>, ImportError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.articles_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("md") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_article(&self, path: &Path) -> Result<NewArticle, ImportError> {
        let raw = std::fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ImportError::InvalidName(path.display().to_string()))?;
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);

        Ok(parse_article(&raw, file_name, stem))
    }
}

#[derive(Default)]
struct Frontmatter {
    title: Option<String>,
    author: Option<String>,
    category: Option<String>,
    summary: Option<String>,
    cover_image: Option<String>,
}

/// Split `---` frontmatter from the body
fn split_frontmatter(content: &str) -> (Option<Frontmatter>, &str) {
    if !content.starts_with("---") {
        return (None, content);
    }

    let parts: Vec<&str> = content.splitn(3, "---").collect();
    if parts.len() < 3 {
        return (None, content);
    }

    (Some(parse_simple_yaml(parts[1])), parts[2].trim_start_matches(['\r', '\n']))
}

/// Flat `key: value` parser, not full YAML
fn parse_simple_yaml(yaml: &str) -> Frontmatter {
    let mut fm = Frontmatter::default();

    for line in yaml.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if value.is_empty() {
            continue;
        }
        let value = Some(value.to_string());

        match key.trim() {
            "title" => fm.title = value,
            "author" => fm.author = value,
            "category" => fm.category = value,
            "summary" => fm.summary = value,
            "cover_image" => fm.cover_image = value,
            _ => {}
        }
    }

    fm
}

/// First `# ` heading in markdown
fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}

fn parse_article(raw: &str, file_name: &str, stem: &str) -> NewArticle {
    let (frontmatter, body) = split_frontmatter(raw);
    let fm = frontmatter.unwrap_or_default();
    let defaults = NewArticle::default();

    NewArticle {
        title: fm
            .title
            .or_else(|| first_heading(body))
            .unwrap_or_else(|| stem.to_string()),
        author: fm.author.unwrap_or(defaults.author),
        category: fm.category.unwrap_or(defaults.category),
        summary: fm.summary.unwrap_or_default(),
        content: body.to_string(),
        cover_image: fm.cover_image.unwrap_or_default(),
        source_file: file_name.to_string(),
        status: defaults.status,
    }
}

#[async_trait]
impl ArticleSource for FsArticleSource {
    async fn load_all(&self) -> Result<Vec<NewArticle>, ImportError> {
        let articles = self
            .markdown_files()?
            .iter()
            .map(|path| self.read_article(path))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            dir = %self.articles_dir.display(),
            count = articles.len(),
            "Loaded markdown articles"
        );

        Ok(articles)
    }

    async fn load(&self, file_name: &str) -> Result<NewArticle, ImportError> {
        if !self.name_pattern.is_match(file_name) {
            return Err(ImportError::InvalidName(file_name.to_string()));
        }

        let path = self.articles_dir.join(file_name);
        if !path.is_file() {
            return Err(ImportError::NotFound(path.display().to_string()));
        }

        self.read_article(&path)
    }

    async fn latest(&self) -> Result<Option<NewArticle>, ImportError> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        for path in self.markdown_files()? {
            let modified = std::fs::metadata(&path)?.modified()?;
            if newest.as_ref().is_none_or(|(time, _)| modified >= *time) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| self.read_article(&path)).transpose()
    }
}
