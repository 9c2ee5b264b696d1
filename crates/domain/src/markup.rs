//! Markdown to WeChat article markup
//!
//! The platform accepts a restricted HTML subset. Conversion is a fixed
//! sequence of literal substitutions; each pass sees the output of the one
//! before it, so the order below matters.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\w*\n(.*?)```").expect("Valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Valid regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("Valid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[(.*?)\]\((.*?)\)").expect("Valid regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").expect("Valid regex"));
static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*?)$").expect("Valid regex"));
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*?)$").expect("Valid regex"));
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*?)$").expect("Valid regex"));

/// Convert markdown into platform markup. Never fails; anything that does not
/// match a pattern is passed through as literal text.
pub fn to_wechat_html(markdown: &str) -> String {
    let html = FENCED_CODE.replace_all(markdown, "<pre>${1}</pre>");
    let html = BOLD.replace_all(&html, "<strong>${1}</strong>");
    // Runs after bold so `**` pairs are already consumed
    let html = ITALIC.replace_all(&html, "<em>${1}</em>");
    let html = LINK.replace_all(&html, |caps: &Captures| {
        if &caps[1] == "!" {
            caps[0].to_string()
        } else {
            format!(r#"<a href="{}">{}</a>"#, &caps[3], &caps[2])
        }
    });
    let html = IMAGE.replace_all(&html, r#"<img src="${2}" alt="${1}"/>"#);
    // Deepest heading first so `# ` never eats a `### ` line
    let html = H3.replace_all(&html, "<h3>${1}</h3>");
    let html = H2.replace_all(&html, "<h2>${1}</h2>");
    let html = H1.replace_all(&html, "<h1>${1}</h1>");

    format!("<p>{}</p>", html.replace("\n\n", "</p><p>"))
}
