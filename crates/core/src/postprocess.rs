//! Post-cleanup of the selected content node.
//!
//! Once a best node is chosen, its direct children are pruned: link lists,
//! empty wrappers and other textless blocks are dropped while paragraphs,
//! headings, media, lists, quotes, code and tables stay.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::parse::Element;
use crate::scoring::link_density;

/// Children that survive post-cleanup whenever they carry text or media
const KEPT_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "img", "figure", "picture", "ul", "ol", "blockquote", "pre", "table",
    "br", "hr",
];

/// Tags the HTML parser only accepts inside a table.
const TABLE_PART_TAGS: &[&str] = &["tbody", "thead", "tfoot", "tr", "td", "th"];

#[allow(clippy::expect_used)]
static LEADING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<([a-zA-Z][a-zA-Z0-9]*)").expect("valid regex"));

#[allow(clippy::expect_used)]
static CLASS_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+class\s*=\s*(?:"[^"]*"|'[^']*')"#).expect("valid regex"));

/// Configuration for post-cleanup
#[derive(Debug, Clone)]
pub struct PostCleanupConfig {
    /// Non-paragraph children above this link density are dropped
    pub max_link_density: f64,
    /// Whether to drop children with neither text nor images
    pub remove_empty_nodes: bool,
    /// Whether to keep class attributes (default: false)
    pub keep_classes: bool,
}

impl Default for PostCleanupConfig {
    fn default() -> Self {
        Self { max_link_density: 0.5, remove_empty_nodes: true, keep_classes: false }
    }
}

/// Prunes the direct children of the node serialized in `html`.
///
/// Returns `html` unchanged when it does not contain an element.
pub fn post_cleanup_html(html: &str, config: &PostCleanupConfig) -> String {
    let Some(tag) = LEADING_TAG_RE.captures(html).and_then(|c| c.get(1)).map(|m| m.as_str().to_lowercase()) else {
        return html.to_string();
    };

    let tree = if tag == "body" {
        Html::parse_document(html)
    } else if TABLE_PART_TAGS.contains(&tag.as_str()) {
        Html::parse_fragment(&format!("<table>{}</table>", html))
    } else {
        Html::parse_fragment(html)
    };
    let Some(node) = tree.root_element().descendants().filter_map(ElementRef::wrap).find(|el| el.value().name() == tag)
    else {
        return html.to_string();
    };

    let mut output = open_tag(node);
    for child in node.children() {
        match child.value() {
            Node::Text(text) => output.push_str(&escape_text(text)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child)
                    && keep_child(Element::new(element), config)
                {
                    output.push_str(&element.html());
                }
            }
            _ => {}
        }
    }
    output.push_str(&format!("</{}>", node.value().name()));

    if config.keep_classes { output } else { strip_classes(&output) }
}

fn keep_child(element: Element<'_>, config: &PostCleanupConfig) -> bool {
    let tag = element.tag_name();
    let has_text = !element.text().trim().is_empty();
    let has_media = tag == "img" || !element.select("img, picture, video").unwrap_or_default().is_empty();

    if config.remove_empty_nodes && !has_text && !has_media && !matches!(tag.as_str(), "br" | "hr") {
        return false;
    }
    if KEPT_TAGS.contains(&tag.as_str()) {
        return true;
    }
    link_density(&element) <= config.max_link_density
}

fn open_tag(element: ElementRef<'_>) -> String {
    let value = element.value();
    let mut tag = format!("<{}", value.name());
    for (name, attr) in value.attrs() {
        tag.push_str(&format!(" {}=\"{}\"", name, escape_attr(attr)));
    }
    tag.push('>');
    tag
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Strip all class attributes from HTML
pub(crate) fn strip_classes(html: &str) -> String {
    CLASS_ATTR_RE.replace_all(html, "").to_string()
}
