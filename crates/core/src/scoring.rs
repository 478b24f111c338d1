//! Scoring primitives used by the content extractor.

use std::sync::LazyLock;

use regex::Regex;

use crate::parse::Element;

/// Weight added for a positive id/class and subtracted for a negative one.
pub const CLASS_WEIGHT: f64 = 25.0;

/// Characters of paragraph text worth one point, up to [`MAX_LENGTH_POINTS`].
const CHARS_PER_POINT: usize = 100;
const MAX_LENGTH_POINTS: f64 = 3.0;

#[allow(clippy::expect_used)]
static POSITIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(article|body|content|entry|hentry|h-entry|main|page|post|text|blog|story)").expect("valid regex")
});

#[allow(clippy::expect_used)]
static NEGATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(banner|breadcrumbs?|combx|comment|community|disqus|extra|foot|header|menu|related|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|widget)",
    )
    .expect("valid regex")
});

/// Score contributed by a paragraph-like node.
///
/// One point for existing, one per comma, and one per hundred characters
/// of text (capped at three).
pub fn paragraph_score(text: &str) -> f64 {
    let length_points = ((text.chars().count() / CHARS_PER_POINT) as f64).min(MAX_LENGTH_POINTS);
    let commas = text.matches([',', '，', '、']).count() as f64;
    1.0 + commas + length_points
}

/// Adjustment from an element's id and class names.
///
/// The id is checked first; among class names the first match decides.
pub fn class_id_weight(element: &Element<'_>) -> f64 {
    let names = element
        .attr("id")
        .into_iter()
        .chain(element.attr("class").into_iter().flat_map(str::split_whitespace));

    for name in names {
        if POSITIVE_RE.is_match(name) {
            return CLASS_WEIGHT;
        }
        if NEGATIVE_RE.is_match(name) {
            return -CLASS_WEIGHT;
        }
    }
    0.0
}

/// Base score of an ancestor by tag name.
pub fn tag_weight(tag_name: &str) -> f64 {
    match tag_name {
        "article" => 10.0,
        "main" | "section" => 8.0,
        "div" => 5.0,
        "td" | "blockquote" => 3.0,
        "form" | "ol" | "ul" | "dl" | "li" | "address" => -3.0,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" | "header" | "footer" | "nav" | "aside" => -5.0,
        _ => 0.0,
    }
}

/// Ratio of link text to all text in an element, from 0.0 to 1.0.
pub fn link_density(element: &Element<'_>) -> f64 {
    let text_length = element.text().chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let link_text_length = element
        .select("a")
        .unwrap_or_default()
        .iter()
        .map(|link| link.text().chars().count())
        .sum::<usize>();

    (link_text_length as f64 / text_length as f64).min(1.0)
}
