//! Parse candidates: content-addressed identifiers for articles.
//!
//! A parse candidate pairs the final article URL with a link hash. The hash
//! is derived from the URL alone before any content exists, and from the URL
//! together with the raw HTML once a body has been downloaded, so the same
//! URL serving different bodies yields different identifiers.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Identifier of an article for deduplication and change detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseCandidate {
    /// Hex encoded SHA-256 digest.
    pub link_hash: String,
    /// The URL the hash was computed for.
    pub final_url: String,
}

impl ParseCandidate {
    /// Builds a candidate from the URL only.
    pub fn from_url(url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"url\0");
        hasher.update(url.as_bytes());
        Self { link_hash: format!("{:x}", hasher.finalize()), final_url: url.to_string() }
    }

    /// Builds a candidate bound to both the URL and the raw HTML.
    pub fn from_raw(url: &str, html: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"raw\0");
        hasher.update((url.len() as u64).to_be_bytes());
        hasher.update(url.as_bytes());
        hasher.update(html.as_bytes());
        Self { link_hash: format!("{:x}", hasher.finalize()), final_url: url.to_string() }
    }

    /// Picks the content-bound path when `html` is non-empty.
    pub fn compute(url: &str, html: &str) -> Self {
        if html.is_empty() { Self::from_url(url) } else { Self::from_raw(url, html) }
    }
}
