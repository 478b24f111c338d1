//! Collaborator ports consumed by [`Article`](crate::Article).
//!
//! The article lifecycle only sequences work; fetching, document building,
//! cleaning, extraction and formatting are delegated to the traits below.
//! A [`Collaborators`] bundle holds one implementation of each and is cheap
//! to clone. [`ArticleBuilder`](crate::ArticleBuilder) starts from the
//! standard bundle and swaps in individual ports, so tests can substitute
//! any stage deterministically.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Configuration;
use crate::extract::ContentExtractor;
use crate::formatters::OutputFormatter;
use crate::parse::{Document, HtmlParser};
use crate::preprocess::DocumentCleaner;
use crate::Result;

/// A response body or caller-supplied markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Already decoded markup.
    Text(String),
    /// Raw bytes in an unknown encoding.
    Bytes(Vec<u8>),
}

impl Body {
    /// Whether the body carries no content.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Text(text) => text.is_empty(),
            Body::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::Bytes(value)
    }
}

impl From<&[u8]> for Body {
    fn from(value: &[u8]) -> Self {
        Body::Bytes(value.to_vec())
    }
}

/// The subtree judged to hold the main content, detached from its document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    /// Lowercase tag name of the node.
    pub tag_name: String,
    /// Outer HTML of the node.
    pub html: String,
    /// Concatenated text of the node.
    pub text: String,
    /// Score assigned by the extractor.
    pub score: f64,
}

/// Network I/O.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves the body at `url`; any error is treated as a failed download.
    async fn fetch(&self, url: &str, config: &Configuration) -> Result<Body>;
}

/// Document construction and charset decoding.
pub trait Parser: Send + Sync {
    /// Builds a document tree, or `None` when the markup cannot form one.
    fn build_document(&self, html: &str) -> Option<Document>;

    /// Decodes a raw body to text.
    fn decode_bytes(&self, bytes: &[u8]) -> String;
}

/// Removes boilerplate from a document before extraction.
pub trait Cleaner: Send + Sync {
    fn clean(&self, document: Document) -> Document;
}

/// Selects and tidies the main content node.
pub trait Extractor: Send + Sync {
    fn select_best_node(&self, document: &Document) -> Option<ContentNode>;

    fn post_cleanup(&self, node: ContentNode) -> ContentNode;
}

/// Serializes a content node to `(text, html)`.
pub trait Formatter: Send + Sync {
    fn format(&self, node: &ContentNode) -> (String, String);
}

/// One implementation of every port.
#[derive(Clone)]
pub struct Collaborators {
    pub fetcher: Arc<dyn Fetcher>,
    pub parser: Arc<dyn Parser>,
    pub cleaner: Arc<dyn Cleaner>,
    pub extractor: Arc<dyn Extractor>,
    pub formatter: Arc<dyn Formatter>,
}

impl Collaborators {
    /// The stock implementations configured from `config`.
    pub fn standard(config: &Configuration) -> Self {
        Self {
            fetcher: default_fetcher(),
            parser: Arc::new(HtmlParser::new()),
            cleaner: Arc::new(DocumentCleaner::default()),
            extractor: Arc::new(ContentExtractor::new(config)),
            formatter: Arc::new(OutputFormatter::new(config)),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

#[cfg(feature = "fetch")]
fn default_fetcher() -> Arc<dyn Fetcher> {
    Arc::new(crate::fetch::HttpFetcher::new())
}

#[cfg(not(feature = "fetch"))]
fn default_fetcher() -> Arc<dyn Fetcher> {
    Arc::new(crate::fetch::OfflineFetcher)
}
