use crate::config::Configuration;
use crate::parse::{Document, Element};
use crate::ports::{ContentNode, Extractor};
use crate::postprocess::{PostCleanupConfig, post_cleanup_html};
use crate::scoring::{class_id_weight, link_density, paragraph_score, tag_weight};

/// Tags whose text is scored and credited to their ancestors
const SCORED_TAGS: &str = "p, pre, td";

/// Tags that can never be chosen as the content container
const NON_CONTAINER_TAGS: &[&str] = &["html", "head", "a", "span", "li", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Configuration for content extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Shortest paragraph text that is scored
    pub min_paragraph_length: usize,
    /// Paragraphs with a higher link density are skipped
    pub max_link_density: f64,
    /// Lowest score a node needs to be selected
    pub min_score: f64,
    /// Post-cleanup configuration
    pub post_cleanup: PostCleanupConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_paragraph_length: 25,
            max_link_density: 0.5,
            min_score: 1.0,
            post_cleanup: PostCleanupConfig::default(),
        }
    }
}

impl From<&Configuration> for ExtractConfig {
    fn from(config: &Configuration) -> Self {
        Self {
            min_paragraph_length: config.min_paragraph_length,
            max_link_density: config.max_link_density,
            post_cleanup: PostCleanupConfig { max_link_density: config.max_link_density, ..Default::default() },
            ..Default::default()
        }
    }
}

/// An ancestor credited with paragraph scores
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    element: Element<'a>,
    score: f64,
    /// Document order of first credit, used to break ties
    order: usize,
}

/// The stock [`Extractor`]: paragraph scores propagated to ancestors.
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    config: ExtractConfig,
}

impl ContentExtractor {
    pub fn new(config: &Configuration) -> Self {
        Self { config: ExtractConfig::from(config) }
    }

    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Credits every qualifying paragraph's score to its parent (in full)
    /// and grandparent (halved).
    fn score_candidates<'a>(&self, document: &'a Document) -> Vec<Candidate<'a>> {
        let mut candidates: Vec<Candidate<'a>> = Vec::new();
        let paragraphs = document.select(SCORED_TAGS).unwrap_or_default();

        for paragraph in paragraphs {
            let text = paragraph.text();
            let text = text.trim();
            if text.chars().count() < self.config.min_paragraph_length {
                continue;
            }
            if link_density(&paragraph) > self.config.max_link_density {
                continue;
            }

            let score = paragraph_score(text);
            let Some(parent) = paragraph.parent() else {
                continue;
            };
            credit(&mut candidates, parent, score);

            if let Some(grandparent) = parent.parent() {
                credit(&mut candidates, grandparent, score / 2.0);
            }
        }

        for candidate in &mut candidates {
            candidate.score *= 1.0 - link_density(&candidate.element);
        }
        candidates
    }
}

/// Adds `score` to an ancestor, seeding it with its tag and class weights.
fn credit<'a>(candidates: &mut Vec<Candidate<'a>>, element: Element<'a>, score: f64) {
    match candidates.iter_mut().find(|candidate| candidate.element == element) {
        Some(candidate) => candidate.score += score,
        None => {
            let order = candidates.len();
            let seed = tag_weight(&element.tag_name()) + class_id_weight(&element);
            candidates.push(Candidate { element, score: seed + score, order });
        }
    }
}

impl Extractor for ContentExtractor {
    fn select_best_node(&self, document: &Document) -> Option<ContentNode> {
        let best = self
            .score_candidates(document)
            .into_iter()
            .filter(|candidate| !NON_CONTAINER_TAGS.contains(&candidate.element.tag_name().as_str()))
            .filter(|candidate| candidate.score >= self.config.min_score)
            .max_by(|a, b| a.score.total_cmp(&b.score).then_with(|| b.order.cmp(&a.order)))?;

        tracing::trace!(tag = %best.element.tag_name(), score = best.score, "selected best node");
        Some(ContentNode {
            tag_name: best.element.tag_name(),
            html: best.element.outer_html(),
            text: best.element.text(),
            score: best.score,
        })
    }

    fn post_cleanup(&self, node: ContentNode) -> ContentNode {
        let html = post_cleanup_html(&node.html, &self.config.post_cleanup);
        let text = crate::formatters::text::plain_text(&html);
        ContentNode { html, text, ..node }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r##"
        <html>
        <body>
            <div id="nav"><a href="/">Home</a> <a href="/about">About</a></div>
            <div class="story">
                <h1>Article Title</h1>
                <p>This is a long paragraph with lots of content, written to exceed the paragraph threshold.</p>
                <p>This is another long paragraph with plenty of content, text, commas, and meaningful sentences.</p>
                <p>A third paragraph with substantial content that should help boost the overall readability score.</p>
            </div>
            <div class="sidebar"><p>Short aside, not much here but with enough characters.</p></div>
        </body>
        </html>
    "##;

    #[test]
    fn test_select_best_node() {
        let doc = Document::parse(ARTICLE_HTML);
        let node = ContentExtractor::default().select_best_node(&doc).unwrap();

        assert_eq!(node.tag_name, "div");
        assert!(node.html.contains(r#"class="story""#));
        assert!(node.text.contains("A third paragraph"));
        assert!(node.score > 0.0);
    }

    #[test]
    fn test_no_candidate_when_only_short_text() {
        let doc = Document::parse("<html><body><div><p>Too short.</p></div></body></html>");
        assert!(ContentExtractor::default().select_best_node(&doc).is_none());
    }

    #[test]
    fn test_link_heavy_paragraphs_are_ignored() {
        let doc = Document::parse(
            r#"<html><body><div><p><a href="/1">A link list entry that is long enough</a></p>
            <p><a href="/2">Another link list entry that is long enough</a></p></div></body></html>"#,
        );
        assert!(ContentExtractor::default().select_best_node(&doc).is_none());
    }

    #[test]
    fn test_config_thresholds_come_from_configuration() {
        let config = Configuration::builder().min_paragraph_length(5).build().unwrap();
        let doc = Document::parse("<html><body><div><p>Short, but enough.</p></div></body></html>");
        let node = ContentExtractor::new(&config).select_best_node(&doc).unwrap();
        assert_eq!(node.tag_name, "div");
    }

    #[test]
    fn test_post_cleanup_refreshes_text() {
        let extractor = ContentExtractor::default();
        let node = ContentNode {
            tag_name: "div".to_string(),
            html: r#"<div><p>Kept paragraph text.</p><div><a href="/a">Related</a> <a href="/b">More</a></div></div>"#
                .to_string(),
            text: "stale".to_string(),
            score: 10.0,
        };

        let cleaned = extractor.post_cleanup(node);
        assert!(cleaned.text.contains("Kept paragraph text."));
        assert!(!cleaned.text.contains("Related"));
        assert!(!cleaned.html.contains("/a"));
        assert_eq!(cleaned.score, 10.0);
    }
}
