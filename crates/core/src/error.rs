//! Error types for Broadsheet operations.
//!
//! This module defines the main error type [`BroadsheetError`] which covers
//! construction failures, lifecycle precondition violations, configuration
//! problems, and the fetch-level failures that the download stage captures
//! as state.
//!
//! # Example
//!
//! ```rust
//! use broadsheet_core::{Article, BroadsheetError};
//!
//! let mut article = Article::new("https://example.com/news/1").unwrap();
//! match article.parse() {
//!     Err(BroadsheetError::NotDownloaded { url }) => println!("download {} first", url),
//!     other => println!("{:?}", other.map(|text| text.len())),
//! }
//! ```

use thiserror::Error;

/// Main error type for article lifecycle operations.
///
/// Network failures raised by a [`Fetcher`](crate::Fetcher) never escape
/// [`Article::download`](crate::Article::download); they are recorded as
/// [`DownloadState::FailedResponse`](crate::DownloadState::FailedResponse)
/// and resurface as [`BroadsheetError::DownloadFailed`] when the caller
/// later tries to parse.
#[derive(Error, Debug)]
pub enum BroadsheetError {
    /// The article URL could not be resolved to a source origin or an
    /// absolute URL.
    #[error("Input URL has a bad format: {0}")]
    BadUrlFormat(String),

    /// `parse` was called before any content was downloaded or supplied.
    #[error("You must download() the article at {url} before parsing it")]
    NotDownloaded { url: String },

    /// `parse` was called after the download attempt failed.
    #[error("Article download() failed with {message} on URL {url}")]
    DownloadFailed { message: String, url: String },

    /// A parsed field was requested before `parse` completed.
    #[error("You must parse() the article at {url} first")]
    NotParsed { url: String },

    /// Invalid configuration value or unknown option override.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Network access is not available in this build.
    #[error("Network fetching is disabled")]
    FetchDisabled,

    /// HTML parsing or serialization errors.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),
}

/// Result type alias for BroadsheetError.
pub type Result<T> = std::result::Result<T, BroadsheetError>;
