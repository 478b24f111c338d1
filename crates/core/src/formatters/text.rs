use scraper::{ElementRef, Html, Node};

use crate::config::Configuration;
use crate::ports::{ContentNode, Formatter};
use crate::postprocess::strip_classes;

const BLOCK_ELEMENTS: [&str; 20] = [
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "blockquote", "pre", "td", "th", "tr", "section", "article",
    "figure", "figcaption", "ul", "ol",
];

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// The stock [`Formatter`]: plain text plus the node's cleaned HTML.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    keep_article_html: bool,
}

impl OutputFormatter {
    pub fn new(config: &Configuration) -> Self {
        Self { keep_article_html: config.keep_article_html }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(&Configuration::default())
    }
}

impl Formatter for OutputFormatter {
    fn format(&self, node: &ContentNode) -> (String, String) {
        let text = plain_text(&node.html);
        let html = if self.keep_article_html { strip_classes(&node.html) } else { String::new() };
        (text, html)
    }
}

/// Extract text from an HTML fragment while preserving block structure.
///
/// Each block element's text becomes one paragraph with collapsed
/// whitespace; paragraphs are separated by a blank line.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut blocks = Vec::new();
    let mut current = String::new();

    collect_blocks(fragment.root_element(), &mut blocks, &mut current);
    flush(&mut blocks, &mut current);

    blocks.join("\n\n")
}

fn collect_blocks(element: ElementRef<'_>, blocks: &mut Vec<String>, current: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(el) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let tag_name = el.name().to_lowercase();
                if SKIPPED_ELEMENTS.contains(&tag_name.as_str()) {
                    continue;
                }

                if tag_name == "br" {
                    current.push(' ');
                } else if BLOCK_ELEMENTS.contains(&tag_name.as_str()) {
                    flush(blocks, current);
                    collect_blocks(child, blocks, current);
                    flush(blocks, current);
                } else {
                    collect_blocks(child, blocks, current);
                }
            }
            _ => {}
        }
    }
}

fn flush(blocks: &mut Vec<String>, current: &mut String) {
    let block = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !block.is_empty() {
        blocks.push(block);
    }
    current.clear();
}
