pub mod article;
pub mod candidate;
pub mod config;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod parse;
pub mod ports;
pub mod postprocess;
pub mod preprocess;
pub mod scoring;
pub mod source;

pub use article::{Article, ArticleBuilder, DownloadState};
pub use candidate::ParseCandidate;
pub use config::{Configuration, ConfigurationBuilder};
pub use encoding::{decode_html, detect_encoding};
pub use error::{BroadsheetError, Result};
#[doc(hidden)]
pub use extract::ExtractConfig;
pub use extract::ContentExtractor;
#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;
pub use fetch::{OfflineFetcher, extract_meta_refresh};
pub use formatters::{OutputFormatter, plain_text};
pub use parse::{Document, Element, HtmlParser};
pub use ports::{Body, Cleaner, Collaborators, ContentNode, Extractor, Fetcher, Formatter, Parser};
#[doc(hidden)]
pub use postprocess::PostCleanupConfig;
pub use postprocess::post_cleanup_html;
#[doc(hidden)]
pub use preprocess::CleanerConfig;
pub use preprocess::DocumentCleaner;
pub use source::{ResolvedSource, get_domain, get_scheme, prepare_url, resolve_source};
