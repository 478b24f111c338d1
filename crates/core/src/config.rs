//! Article processing configuration.
//!
//! [`Configuration`] is read by every pipeline stage. Callers either build
//! one with [`Configuration::builder`] or start from the defaults and merge
//! a map of named option overrides with [`Configuration::extend`]; both paths
//! end in [`Configuration::validate`].
//!
//! # Example
//!
//! ```rust
//! use broadsheet_core::Configuration;
//! use serde_json::json;
//!
//! let overrides = json!({ "max_text": 5000, "follow_meta_refresh": true });
//! let config = Configuration::default()
//!     .extend(overrides.as_object().unwrap())
//!     .unwrap();
//! assert_eq!(config.max_text, 5000);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{BroadsheetError, Result};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Broadsheet/0.1)";

/// Settings shared by the fetcher, parser and pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    /// Two-letter language code of the articles (default: "en").
    pub language: String,

    /// Maximum title length in characters (default: 200).
    pub max_title: usize,

    /// Maximum article text length in characters (default: 100000).
    pub max_text: usize,

    /// Minimum word count for a valid article body (default: 300).
    pub min_word_count: usize,

    /// Minimum sentence count for a valid article body (default: 7).
    pub min_sent_count: usize,

    /// Whether to keep the HTML of the main content node (default: true).
    pub keep_article_html: bool,

    /// Whether to follow a `<meta http-equiv="refresh">` once (default: false).
    pub follow_meta_refresh: bool,

    /// Whether non-2xx responses count as failed downloads (default: true).
    pub http_success_only: bool,

    /// User-Agent sent with every request.
    pub browser_user_agent: String,

    /// Request timeout in seconds (default: 7).
    pub request_timeout: u64,

    /// Extra request headers.
    pub headers: BTreeMap<String, String>,

    /// Shortest paragraph text considered during node scoring (default: 25).
    pub min_paragraph_length: usize,

    /// Link density above which a node counts as navigation (default: 0.5).
    pub max_link_density: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            max_title: 200,
            max_text: 100_000,
            min_word_count: 300,
            min_sent_count: 7,
            keep_article_html: true,
            follow_meta_refresh: false,
            http_success_only: true,
            browser_user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: 7,
            headers: BTreeMap::new(),
            min_paragraph_length: 25,
            max_link_density: 0.5,
        }
    }
}

impl Configuration {
    /// Creates a new builder for Configuration.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Merges named option overrides into a copy of this configuration.
    ///
    /// Keys are the field names of [`Configuration`]. Unknown keys and values
    /// of the wrong type are rejected, and the merged result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::ConfigError`] for unknown keys, mistyped
    /// values, or a merged configuration that fails [`Configuration::validate`].
    pub fn extend(&self, overrides: &Map<String, Value>) -> Result<Self> {
        if overrides.is_empty() {
            return Ok(self.clone());
        }

        let mut merged = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(BroadsheetError::ConfigError("configuration is not an object".to_string())),
            Err(e) => return Err(BroadsheetError::ConfigError(e.to_string())),
        };

        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }

        let config: Configuration = serde_json::from_value(Value::Object(merged))
            .map_err(|e| BroadsheetError::ConfigError(format!("invalid option override: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field holds a usable value.
    pub fn validate(&self) -> Result<()> {
        if self.max_text == 0 {
            return Err(BroadsheetError::ConfigError("max_text must be greater than zero".to_string()));
        }
        if self.max_title == 0 {
            return Err(BroadsheetError::ConfigError("max_title must be greater than zero".to_string()));
        }
        if self.request_timeout == 0 {
            return Err(BroadsheetError::ConfigError("request_timeout must be greater than zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.max_link_density) {
            return Err(BroadsheetError::ConfigError(format!(
                "max_link_density must be within 0.0..=1.0, got {}",
                self.max_link_density
            )));
        }
        if self.language.len() != 2 || !self.language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(BroadsheetError::ConfigError(format!(
                "language must be a two-letter code, got {:?}",
                self.language
            )));
        }
        Ok(())
    }
}

/// Builder for Configuration.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::Configuration;
///
/// let config = Configuration::builder()
///     .max_text(2000)
///     .request_timeout(10)
///     .keep_article_html(false)
///     .build()
///     .unwrap();
/// ```
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: Configuration::default() }
    }

    /// Sets the language code.
    pub fn language(mut self, value: impl Into<String>) -> Self {
        self.config.language = value.into();
        self
    }

    /// Sets the maximum title length.
    pub fn max_title(mut self, value: usize) -> Self {
        self.config.max_title = value;
        self
    }

    /// Sets the maximum text length.
    pub fn max_text(mut self, value: usize) -> Self {
        self.config.max_text = value;
        self
    }

    /// Sets the minimum word count for a valid body.
    pub fn min_word_count(mut self, value: usize) -> Self {
        self.config.min_word_count = value;
        self
    }

    /// Sets the minimum sentence count for a valid body.
    pub fn min_sent_count(mut self, value: usize) -> Self {
        self.config.min_sent_count = value;
        self
    }

    /// Sets whether the main node HTML is kept.
    pub fn keep_article_html(mut self, value: bool) -> Self {
        self.config.keep_article_html = value;
        self
    }

    /// Sets whether a meta refresh is followed.
    pub fn follow_meta_refresh(mut self, value: bool) -> Self {
        self.config.follow_meta_refresh = value;
        self
    }

    /// Sets whether non-2xx responses fail the download.
    pub fn http_success_only(mut self, value: bool) -> Self {
        self.config.http_success_only = value;
        self
    }

    /// Sets the User-Agent.
    pub fn browser_user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.browser_user_agent = value.into();
        self
    }

    /// Sets the request timeout in seconds.
    pub fn request_timeout(mut self, value: u64) -> Self {
        self.config.request_timeout = value;
        self
    }

    /// Adds an extra request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the shortest paragraph considered during scoring.
    pub fn min_paragraph_length(mut self, value: usize) -> Self {
        self.config.min_paragraph_length = value;
        self
    }

    /// Sets the navigation link density threshold.
    pub fn max_link_density(mut self, value: f64) -> Self {
        self.config.max_link_density = value;
        self
    }

    /// Validates and builds the config.
    pub fn build(self) -> Result<Configuration> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
