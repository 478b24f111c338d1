//! Document cleaning before extraction.
//!
//! [`DocumentCleaner`] strips markup that never carries article text
//! (scripts, styles, embedded media, forms), comments, hidden elements and
//! boilerplate containers recognised by their id or class.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Document;
use crate::ports::Cleaner;

/// Tags removed together with their content.
const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "svg", "canvas", "form", "object", "embed"];

/// Tags never removed by the unlikely-candidate rule.
const PROTECTED_TAGS: &[&str] = &["html", "head", "body", "article", "main"];

#[allow(clippy::expect_used)]
static UNLIKELY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|share|social|cookie|newsletter)",
    )
    .expect("valid regex")
});

#[allow(clippy::expect_used)]
static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story)").expect("valid regex")
});

#[allow(clippy::expect_used)]
static HIDDEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").expect("valid regex"));

/// Configuration for document cleaning
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Whether to remove script, style, media and form elements
    pub remove_stripped_tags: bool,
    /// Whether to remove HTML comments
    pub remove_comments: bool,
    /// Whether to remove elements whose id/class marks them as boilerplate
    pub remove_unlikely: bool,
    /// Whether positive id/class patterns protect an element from removal
    pub keep_positive: bool,
    /// Whether to remove elements hidden by inline style
    pub remove_hidden: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            remove_stripped_tags: true,
            remove_comments: true,
            remove_unlikely: true,
            keep_positive: true,
            remove_hidden: true,
        }
    }
}

/// The stock [`Cleaner`], a single `lol_html` rewriting pass.
#[derive(Debug, Clone, Default)]
pub struct DocumentCleaner {
    config: CleanerConfig,
}

impl DocumentCleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Cleans serialized HTML, returning the input unchanged if rewriting fails.
    pub fn clean_html(&self, html: &str) -> String {
        let config = &self.config;
        let mut output = String::with_capacity(html.len());

        let mut rewriter = lol_html::HtmlRewriter::new(
            lol_html::Settings {
                element_content_handlers: vec![lol_html::element!("*", |el| {
                    let tag = el.tag_name();
                    if config.remove_stripped_tags && STRIPPED_TAGS.contains(&tag.as_str()) {
                        el.remove();
                        return Ok(());
                    }

                    if config.remove_hidden
                        && let Some(style) = el.get_attribute("style")
                        && HIDDEN_RE.is_match(&style)
                    {
                        el.remove();
                        return Ok(());
                    }

                    if config.remove_unlikely
                        && !PROTECTED_TAGS.contains(&tag.as_str())
                        && is_unlikely(el.get_attribute("id"), el.get_attribute("class"), config.keep_positive)
                    {
                        el.remove();
                    }
                    Ok(())
                })],
                document_content_handlers: if config.remove_comments {
                    vec![lol_html::doc_comments!(|c| {
                        c.remove();
                        Ok(())
                    })]
                } else {
                    Vec::new()
                },
                ..Default::default()
            },
            |c: &[u8]| {
                output.push_str(&String::from_utf8_lossy(c));
            },
        );

        if rewriter.write(html.as_bytes()).is_err() || rewriter.end().is_err() {
            tracing::debug!("html rewriting failed, keeping document uncleaned");
            return html.to_string();
        }

        output
    }
}

impl Cleaner for DocumentCleaner {
    fn clean(&self, document: Document) -> Document {
        let cleaned = self.clean_html(&document.as_string());
        if cleaned.trim().is_empty() {
            return document;
        }
        Document::parse(&cleaned)
    }
}

/// Whether an element's id or any class names a boilerplate container.
fn is_unlikely(id: Option<String>, class: Option<String>, keep_positive: bool) -> bool {
    let names = id.as_deref().into_iter().chain(class.as_deref().into_iter().flat_map(str::split_whitespace));

    let mut unlikely = false;
    for name in names {
        if keep_positive && POSITIVE_RE.is_match(name) {
            return false;
        }
        if UNLIKELY_RE.is_match(name) {
            unlikely = true;
        }
    }
    unlikely
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_stripped_tags() {
        let html = r#"
            <html>
                <head><script>alert('test');</script><style>body{color:red;}</style></head>
                <body>
                    <noscript>Enable JavaScript</noscript>
                    <iframe src="https://example.com"></iframe>
                    <svg><rect width="100" height="100"/></svg>
                    <form><input name="q"></form>
                    <p>Content</p>
                </body>
            </html>
        "#;

        let result = DocumentCleaner::default().clean_html(html);
        assert!(!result.contains("alert"));
        assert!(!result.contains("color:red"));
        assert!(!result.contains("Enable JavaScript"));
        assert!(!result.contains("<iframe"));
        assert!(!result.contains("rect"));
        assert!(!result.contains("<input"));
        assert!(result.contains("<p>Content</p>"));
    }

    #[test]
    fn test_remove_comments() {
        let html = "<body><!-- note --><p>Visible content</p></body>";
        let result = DocumentCleaner::default().clean_html(html);
        assert!(!result.contains("<!--"));
        assert!(result.contains("Visible content"));

        let keep = DocumentCleaner::new(CleanerConfig { remove_comments: false, ..Default::default() });
        assert!(keep.clean_html(html).contains("<!-- note -->"));
    }

    #[test]
    fn test_remove_unlikely_candidates() {
        let html = r#"
            <body>
                <div id="sidebar">Sidebar content</div>
                <div id="main-content">Main content</div>
                <div class="banner-ad">Ad</div>
                <div class="comment-list post-body">Kept by positive class</div>
                <footer class="site-footer">Footer</footer>
            </body>
        "#;

        let result = DocumentCleaner::default().clean_html(html);
        assert!(!result.contains("Sidebar content"));
        assert!(!result.contains(">Ad<"));
        assert!(!result.contains("Footer"));
        assert!(result.contains("Main content"));
        assert!(result.contains("Kept by positive class"));
    }

    #[test]
    fn test_body_is_protected() {
        let html = r#"<html><body class="footer-fixed"><p>Text</p></body></html>"#;
        assert!(DocumentCleaner::default().clean_html(html).contains("Text"));
    }

    #[test]
    fn test_remove_hidden_elements() {
        let html = r#"
            <body>
                <div style="display:none">Hidden content</div>
                <div style="visibility: hidden">Invisible content</div>
                <div>Visible content</div>
            </body>
        "#;

        let result = DocumentCleaner::default().clean_html(html);
        assert!(!result.contains("Hidden content"));
        assert!(!result.contains("Invisible content"));
        assert!(result.contains("Visible content"));
    }

    #[test]
    fn test_clean_document() {
        let doc = Document::parse(
            r#"<html><body><nav class="menu"><a href="/">Home</a></nav><article><p>Body text</p></article></body></html>"#,
        );
        let cleaned = DocumentCleaner::default().clean(doc);
        let text = cleaned.text_content();
        assert!(text.contains("Body text"));
        assert!(!text.contains("Home"));
    }
}
