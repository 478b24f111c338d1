//! The article lifecycle.
//!
//! An [`Article`] tracks one document from construction through download and
//! parse. Construction resolves the source origin and absolute URL;
//! [`Article::download`] fills the raw HTML (or records a failed download);
//! [`Article::parse`] runs the collaborator pipeline and stores the extracted
//! text and HTML.
//!
//! # Example
//!
//! ```rust
//! use broadsheet_core::{Article, Body};
//!
//! let html = "<html><head><title>Hello world</title></head><body><div>\
//!     <p>A paragraph that is long enough to be scored by the extractor.</p></div></body></html>";
//!
//! let mut article = Article::new("https://example.com/news/1").unwrap();
//! article.set_html(Body::from(html));
//! let text = article.parse().unwrap();
//!
//! assert!(article.is_parsed());
//! assert!(text.contains("long enough"));
//! assert_eq!(article.title(), "Hello world");
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::candidate::ParseCandidate;
use crate::config::Configuration;
use crate::fetch::extract_meta_refresh;
use crate::parse::Document;
use crate::ports::{Body, Cleaner, Collaborators, ContentNode, Extractor, Fetcher, Formatter, Parser};
use crate::source::{prepare_url, resolve_source};
use crate::{BroadsheetError, Result};

/// URL fragments of pages whose value is media rather than prose.
const MEDIA_URL_PARTS: [&str; 7] = ["/video", "/slide", "/gallery", "/powerpoint", "/fashion", "/glamour", "/cloth"];

/// Download progress of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DownloadState {
    /// Neither `download` nor `set_html` has stored content yet.
    #[default]
    NotStarted,
    /// The last fetch failed with `message`.
    FailedResponse { message: String },
    /// Raw HTML is available.
    Success,
}

/// One document's download/parse lifecycle and extracted output.
#[derive(Debug)]
pub struct Article {
    config: Arc<Configuration>,
    collaborators: Collaborators,
    source_url: String,
    url: String,
    title: String,
    html: String,
    text: String,
    article_html: String,
    document: Option<Document>,
    top_node: Option<ContentNode>,
    link_hash: Option<String>,
    download_state: DownloadState,
    is_parsed: bool,
}

impl Article {
    /// Creates an article for `url` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::BadUrlFormat`] if no source origin can be
    /// derived from `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::builder(url).build()
    }

    /// Starts building an article for `url`.
    pub fn builder(url: impl Into<String>) -> ArticleBuilder {
        ArticleBuilder::new(url)
    }

    /// Downloads the article, or adopts `input_html` without network I/O.
    ///
    /// Fetch errors are not returned; they are recorded as
    /// [`DownloadState::FailedResponse`] and surface from [`Article::parse`].
    pub async fn download(&mut self, input_html: Option<Body>) {
        let body = match input_html {
            Some(body) => body,
            None => {
                let fetcher = Arc::clone(&self.collaborators.fetcher);
                let parser = Arc::clone(&self.collaborators.parser);
                let config = Arc::clone(&self.config);
                let url = self.url.clone();
                match fetch_following_refresh(fetcher.as_ref(), parser.as_ref(), &config, &url).await {
                    Ok(body) => body,
                    Err(e) => {
                        self.record_failure(&e);
                        return;
                    }
                }
            }
        };

        self.set_html(body);
    }

    fn record_failure(&mut self, error: &BroadsheetError) {
        let message = error.to_string();
        tracing::debug!(url = %self.url, error = %message, "download failed");
        self.download_state = DownloadState::FailedResponse { message };
    }

    /// Stores raw content and marks the download successful.
    ///
    /// An empty body is ignored. Bytes are decoded with the parser's charset
    /// detection. Well-formedness is not checked here.
    pub fn set_html(&mut self, body: impl Into<Body>) {
        let body: Body = body.into();
        if body.is_empty() {
            return;
        }

        let html = match body {
            Body::Text(text) => text,
            Body::Bytes(bytes) => self.collaborators.parser.decode_bytes(&bytes),
        };

        tracing::trace!(url = %self.url, len = html.len(), "html set");
        self.html = html;
        self.download_state = DownloadState::Success;
    }

    /// Runs the extraction pipeline and returns the text extracted by this run.
    ///
    /// The result is empty when no content node is selected, even if an
    /// earlier parse stored text. When the parser cannot build a document,
    /// returns an empty string and leaves the article unparsed. Every call
    /// re-runs the whole pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::NotDownloaded`] before any content was
    /// stored and [`BroadsheetError::DownloadFailed`] after a failed fetch.
    pub fn parse(&mut self) -> Result<String> {
        self.throw_if_not_downloaded()?;

        let Some(document) = self.collaborators.parser.build_document(&self.html) else {
            tracing::debug!(url = %self.url, "no document could be built");
            return Ok(String::new());
        };

        self.link_hash = Some(self.get_parse_candidate().link_hash);
        if self.title.is_empty()
            && let Some(title) = document.title()
        {
            self.set_title(&title);
        }

        let Collaborators { cleaner, extractor, formatter, .. } = &self.collaborators;
        let cleaned = cleaner.clean(document.clone());
        tracing::trace!(url = %self.url, "document cleaned");

        let top_node = extractor.select_best_node(&cleaned).map(|node| extractor.post_cleanup(node));
        let output = top_node.as_ref().map(|node| formatter.format(node));
        let text = match output {
            Some((text, html)) => {
                let text: String = text.chars().take(self.config.max_text).collect();
                self.set_text(&text);
                self.set_article_html(&html);
                text
            }
            None => {
                tracing::debug!(url = %self.url, "no content node selected");
                String::new()
            }
        };

        self.top_node = top_node;
        self.document = Some(document);
        self.is_parsed = true;
        Ok(text)
    }

    /// Computes the article's identifier from its URL and current HTML.
    pub fn get_parse_candidate(&self) -> ParseCandidate {
        ParseCandidate::compute(&self.url, &self.html)
    }

    /// Stores `text` truncated to `max_text` characters, unless that is empty.
    pub fn set_text(&mut self, text: &str) {
        let text: String = text.chars().take(self.config.max_text).collect();
        if !text.is_empty() {
            self.text = text;
        }
    }

    /// Stores `html` unless it is empty.
    pub fn set_article_html(&mut self, html: &str) {
        if !html.is_empty() {
            self.article_html = html.to_string();
        }
    }

    /// Stores `title` truncated to `max_title` characters, unless that is empty.
    pub fn set_title(&mut self, title: &str) {
        let title: String = title.chars().take(self.config.max_title).collect();
        if !title.is_empty() {
            self.title = title;
        }
    }

    /// Whether the extracted body looks like a real news article.
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::NotParsed`] before a successful parse.
    pub fn is_valid_body(&self) -> Result<bool> {
        self.throw_if_not_parsed()?;

        let word_count = self.text.split_whitespace().count();
        let sentence_count = self.text.split(['.', '!', '?']).filter(|s| !s.trim().is_empty()).count();
        let og_type = self.document.as_ref().and_then(|doc| doc.meta_content("og:type"));

        if og_type.as_deref() == Some("article") && word_count > self.config.min_word_count {
            return Ok(true);
        }
        if !self.is_media_news() && self.text.is_empty() {
            return Ok(false);
        }
        if self.title.split_whitespace().count() < 2 {
            return Ok(false);
        }
        if word_count < self.config.min_word_count || sentence_count < self.config.min_sent_count {
            return Ok(false);
        }
        Ok(!self.html.is_empty())
    }

    /// Whether the URL points at a media-centric page.
    pub fn is_media_news(&self) -> bool {
        let url = self.url.to_lowercase();
        MEDIA_URL_PARTS.iter().any(|part| url.contains(part))
    }

    /// Fails unless a document was built by [`Article::parse`].
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::NotParsed`] unless `parse` completed.
    pub fn throw_if_not_parsed(&self) -> Result<()> {
        if self.is_parsed { Ok(()) } else { Err(BroadsheetError::NotParsed { url: self.url.clone() }) }
    }

    /// Fails unless raw HTML is available to parse.
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::NotDownloaded`] or
    /// [`BroadsheetError::DownloadFailed`] unless content is available.
    pub fn throw_if_not_downloaded(&self) -> Result<()> {
        match &self.download_state {
            DownloadState::Success => Ok(()),
            DownloadState::NotStarted => Err(BroadsheetError::NotDownloaded { url: self.url.clone() }),
            DownloadState::FailedResponse { message } => {
                Err(BroadsheetError::DownloadFailed { message: message.clone(), url: self.url.clone() })
            }
        }
    }

    /// Gets the article state as structured JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "url": self.url,
            "source_url": self.source_url,
            "title": self.title,
            "link_hash": self.link_hash,
            "download_state": self.download_state,
            "is_parsed": self.is_parsed,
            "text": self.text,
            "article_html": self.article_html,
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw markup; empty until content is stored.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn article_html(&self) -> &str {
        &self.article_html
    }

    /// The document built by the last successful parse.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// The post-cleaned content node chosen by the last successful parse.
    pub fn top_node(&self) -> Option<&ContentNode> {
        self.top_node.as_ref()
    }

    pub fn link_hash(&self) -> Option<&str> {
        self.link_hash.as_deref()
    }

    pub fn download_state(&self) -> &DownloadState {
        &self.download_state
    }

    pub fn is_parsed(&self) -> bool {
        self.is_parsed
    }
}

/// Fetches `url` and, when enabled, replaces the body with its meta refresh
/// target. At most one refresh is followed.
async fn fetch_following_refresh(
    fetcher: &dyn Fetcher, parser: &dyn Parser, config: &Configuration, url: &str,
) -> Result<Body> {
    let body = fetcher.fetch(url, config).await?;
    if !config.follow_meta_refresh {
        return Ok(body);
    }

    let target = match &body {
        Body::Text(text) => extract_meta_refresh(text),
        Body::Bytes(bytes) => extract_meta_refresh(&parser.decode_bytes(bytes)),
    };
    let Some(target) = target else {
        return Ok(body);
    };

    let target = match prepare_url(&target, url) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!(%url, %target, error = %e, "ignoring meta refresh target");
            return Ok(body);
        }
    };

    tracing::debug!(%url, %target, "following meta refresh");
    fetcher.fetch(&target, config).await
}

/// Builder for [`Article`].
///
/// Ports left unset come from [`Collaborators::standard`], configured with
/// the merged options.
pub struct ArticleBuilder {
    url: String,
    title: String,
    source_url: Option<String>,
    config: Option<Arc<Configuration>>,
    overrides: Map<String, Value>,
    fetcher: Option<Arc<dyn Fetcher>>,
    parser: Option<Arc<dyn Parser>>,
    cleaner: Option<Arc<dyn Cleaner>>,
    extractor: Option<Arc<dyn Extractor>>,
    formatter: Option<Arc<dyn Formatter>>,
}

impl ArticleBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            source_url: None,
            config: None,
            overrides: Map::new(),
            fetcher: None,
            parser: None,
            cleaner: None,
            extractor: None,
            formatter: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Pins the source origin instead of deriving it from the URL.
    ///
    /// An empty value means "not provided".
    pub fn source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    /// Uses `config`, possibly shared with other articles.
    pub fn config(mut self, config: impl Into<Arc<Configuration>>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Overrides one configuration option by its field name.
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    pub fn options(mut self, overrides: Map<String, Value>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaner = Some(Arc::new(cleaner));
        self
    }

    pub fn extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// # Errors
    ///
    /// Returns [`BroadsheetError::ConfigError`] for unknown or invalid option
    /// overrides and [`BroadsheetError::BadUrlFormat`] when the URL cannot be
    /// resolved.
    pub fn build(self) -> Result<Article> {
        let config = match self.config {
            Some(config) if self.overrides.is_empty() => {
                config.validate()?;
                config
            }
            Some(config) => Arc::new(config.extend(&self.overrides)?),
            None => Arc::new(Configuration::default().extend(&self.overrides)?),
        };

        let resolved = resolve_source(&self.url, self.source_url.as_deref())?;

        let mut collaborators = Collaborators::standard(&config);
        if let Some(fetcher) = self.fetcher {
            collaborators.fetcher = fetcher;
        }
        if let Some(parser) = self.parser {
            collaborators.parser = parser;
        }
        if let Some(cleaner) = self.cleaner {
            collaborators.cleaner = cleaner;
        }
        if let Some(extractor) = self.extractor {
            collaborators.extractor = extractor;
        }
        if let Some(formatter) = self.formatter {
            collaborators.formatter = formatter;
        }
        tracing::debug!(url = %resolved.url, source_url = %resolved.source_url, "article created");

        let mut article = Article {
            config,
            collaborators,
            source_url: resolved.source_url,
            url: resolved.url,
            title: String::new(),
            html: String::new(),
            text: String::new(),
            article_html: String::new(),
            document: None,
            top_node: None,
            link_hash: None,
            download_state: DownloadState::NotStarted,
            is_parsed: false,
        };
        article.set_title(&self.title);
        Ok(article)
    }
}

impl fmt::Debug for ArticleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleBuilder")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("source_url", &self.source_url)
            .field("config", &self.config)
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY_HTML: &str = r#"
        <html>
        <head><title>Council approves new park</title><meta property="og:type" content="article"></head>
        <body>
            <div class="menu"><a href="/">Home</a> <a href="/news">News</a></div>
            <div class="story">
                <p>The city council voted on Tuesday, after months of debate, to approve the new riverside park.</p>
                <p>Construction is expected to begin next spring, and the park should open within two years.</p>
            </div>
        </body>
        </html>
    "#;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(future)
    }

    #[test]
    fn test_new_resolves_source() {
        let article = Article::new("https://example.com/news/1").unwrap();
        assert_eq!(article.source_url(), "https://example.com");
        assert_eq!(article.url(), "https://example.com/news/1");
        assert_eq!(article.download_state(), &DownloadState::NotStarted);
        assert!(!article.is_parsed());
        assert!(article.link_hash().is_none());
    }

    #[test]
    fn test_new_rejects_unresolvable_url() {
        assert!(matches!(Article::new(""), Err(BroadsheetError::BadUrlFormat(_))));
        assert!(matches!(Article::new("/relative/only"), Err(BroadsheetError::BadUrlFormat(_))));
    }

    #[test]
    fn test_pinned_source_url_is_kept() {
        let article = Article::builder("/wire/story").source_url("https://syndicate.example").build().unwrap();
        assert_eq!(article.source_url(), "https://syndicate.example");
        assert_eq!(article.url(), "https://syndicate.example/wire/story");
    }

    #[test]
    fn test_option_overrides() {
        let article = Article::builder("http://example.com/a").option("max_text", 5).build().unwrap();
        assert_eq!(article.config().max_text, 5);

        let unknown = Article::builder("http://example.com/a").option("no_such_option", true).build();
        assert!(matches!(unknown, Err(BroadsheetError::ConfigError(_))));

        let invalid = Article::builder("http://example.com/a").option("max_text", 0).build();
        assert!(matches!(invalid, Err(BroadsheetError::ConfigError(_))));
    }

    #[test]
    fn test_shared_config_is_not_mutated_by_overrides() {
        let shared = Arc::new(Configuration::default());
        let article =
            Article::builder("http://example.com/a").config(Arc::clone(&shared)).option("max_title", 3).build().unwrap();
        assert_eq!(article.config().max_title, 3);
        assert_eq!(shared.max_title, Configuration::default().max_title);
    }

    #[test]
    fn test_title_is_truncated() {
        let article =
            Article::builder("http://example.com/a").title("Abcdefgh").option("max_title", 4).build().unwrap();
        assert_eq!(article.title(), "Abcd");
    }

    #[test]
    fn test_set_text_truncates_and_ignores_empty() {
        let mut article = Article::builder("http://example.com/a").option("max_text", 5).build().unwrap();
        article.set_text("héllo world");
        assert_eq!(article.text(), "héllo");
        article.set_text("");
        assert_eq!(article.text(), "héllo");
    }

    #[test]
    fn test_set_article_html_ignores_empty() {
        let mut article = Article::new("http://example.com/a").unwrap();
        article.set_article_html("<p>x</p>");
        article.set_article_html("");
        assert_eq!(article.article_html(), "<p>x</p>");
    }

    #[test]
    fn test_set_html() {
        let mut article = Article::new("http://example.com/a").unwrap();
        article.set_html("");
        assert_eq!(article.download_state(), &DownloadState::NotStarted);

        article.set_html(b"<meta charset=\"iso-8859-1\"><p>caf\xe9</p>".to_vec());
        assert_eq!(article.download_state(), &DownloadState::Success);
        assert!(article.html().contains("café"));
    }

    #[test]
    fn test_parse_requires_download() {
        let mut article = Article::new("http://example.com/a").unwrap();
        assert!(matches!(article.parse(), Err(BroadsheetError::NotDownloaded { .. })));
        assert!(matches!(article.is_valid_body(), Err(BroadsheetError::NotParsed { .. })));
    }

    #[test]
    fn test_download_with_input_html_and_parse() {
        let mut article = Article::new("http://example.com/news/park").unwrap();
        block_on(article.download(Some(Body::from(STORY_HTML))));
        assert_eq!(article.download_state(), &DownloadState::Success);

        let text = article.parse().unwrap();
        assert!(text.starts_with("The city council voted"));
        assert!(!text.contains("Home"));
        assert_eq!(article.title(), "Council approves new park");
        assert!(article.article_html().starts_with("<div>"));
        assert_eq!(article.top_node().map(|node| node.tag_name.as_str()), Some("div"));
        assert!(article.document().is_some());
        assert_eq!(article.link_hash(), Some(article.get_parse_candidate().link_hash.as_str()));
    }

    #[test]
    fn test_parse_returns_only_this_runs_text() {
        let mut article = Article::new("http://example.com/news/park").unwrap();
        article.set_html(STORY_HTML);
        let first = article.parse().unwrap();
        assert!(first.starts_with("The city council voted"));

        article.set_html("<html><body><p>Short.</p></body></html>");
        assert_eq!(article.parse().unwrap(), "");
        assert!(article.is_parsed());
        assert!(article.top_node().is_none());
        assert_eq!(article.text(), first);
    }

    #[test]
    fn test_article_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<Article>();
        assert_send::<ArticleBuilder>();
    }

    #[test]
    fn test_blank_document_is_not_parsed() {
        let mut article = Article::new("http://example.com/a").unwrap();
        article.set_html("   ");
        assert_eq!(article.parse().unwrap(), "");
        assert!(!article.is_parsed());
        assert!(article.link_hash().is_none());
    }

    #[test]
    fn test_is_valid_body() {
        let mut article = Article::builder("http://example.com/news/park")
            .option("min_word_count", 10)
            .option("min_sent_count", 2)
            .build()
            .unwrap();
        article.set_html(STORY_HTML);
        article.parse().unwrap();
        assert!(article.is_valid_body().unwrap());

        let mut short = Article::builder("http://example.com/news/park").build().unwrap();
        short.set_html(STORY_HTML);
        short.parse().unwrap();
        assert!(!short.is_valid_body().unwrap());
    }

    #[test]
    fn test_is_media_news() {
        assert!(Article::new("http://example.com/Gallery/123").unwrap().is_media_news());
        assert!(!Article::new("http://example.com/news/123").unwrap().is_media_news());
    }

    #[test]
    fn test_to_json() {
        let mut article = Article::new("http://example.com/a").unwrap();
        let value = article.to_json();
        assert_eq!(value["download_state"]["state"], "not_started");
        assert_eq!(value["link_hash"], Value::Null);

        article.set_html(STORY_HTML);
        article.parse().unwrap();
        let value = article.to_json();
        assert_eq!(value["download_state"]["state"], "success");
        assert_eq!(value["is_parsed"], true);
        assert_eq!(value["source_url"], "http://example.com");
    }
}
