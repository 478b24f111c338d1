//! Fetcher implementations.
//!
//! [`HttpFetcher`] performs the single network call an article makes during
//! `download`. Its errors are never surfaced to the caller of `download`;
//! the article records them as a failed download state.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::config::Configuration;
use crate::ports::{Body, Fetcher};
use crate::{BroadsheetError, Result};

/// Match the content of `<meta http-equiv="refresh" content="5; url=...">`
#[allow(clippy::expect_used)]
static META_REFRESH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<meta[^>]+http-equiv\s*=\s*["']?refresh["']?[^>]*content\s*=\s*["']\s*\d*\s*;?\s*url\s*=\s*['"]?([^"'>]+)"#)
        .expect("valid regex")
});

/// Returns the target of a meta refresh declared in `html`, if any.
pub fn extract_meta_refresh(html: &str) -> Option<String> {
    META_REFRESH_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
}

/// HTTP fetcher backed by a shared reqwest client.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "fetch")]
impl HttpFetcher {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// Uses a preconfigured client, e.g. one with a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "fetch")]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, config: &Configuration) -> Result<Body> {
        use std::time::Duration;

        let parsed_url = url::Url::parse(url).map_err(|e| BroadsheetError::BadUrlFormat(e.to_string()))?;

        let mut request = self
            .client
            .get(parsed_url)
            .timeout(Duration::from_secs(config.request_timeout))
            .header("User-Agent", &config.browser_user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            );
        for (name, value) in &config.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BroadsheetError::Timeout { timeout: config.request_timeout }
            } else {
                BroadsheetError::HttpError(e)
            }
        })?;

        let status = response.status();
        if config.http_success_only && !status.is_success() {
            return Err(BroadsheetError::HttpStatus { status: status.as_u16(), url: url.to_string() });
        }

        let bytes = response.bytes().await?;
        tracing::trace!(url, status = status.as_u16(), len = bytes.len(), "fetched body");
        Ok(Body::Bytes(bytes.to_vec()))
    }
}

/// Fetcher used when the crate is built without network support.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

#[async_trait]
impl Fetcher for OfflineFetcher {
    async fn fetch(&self, _url: &str, _config: &Configuration) -> Result<Body> {
        Err(BroadsheetError::FetchDisabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_meta_refresh() {
        let html = r#"<html><head><meta http-equiv="refresh" content="0; url=https://example.com/real"></head></html>"#;
        assert_eq!(extract_meta_refresh(html).as_deref(), Some("https://example.com/real"));
    }

    #[test]
    fn test_extract_meta_refresh_quoted_relative() {
        let html = r#"<META HTTP-EQUIV="Refresh" CONTENT="5;URL='/moved/here'">"#;
        assert_eq!(extract_meta_refresh(html).as_deref(), Some("/moved/here"));
    }

    #[test]
    fn test_extract_meta_refresh_absent() {
        assert_eq!(extract_meta_refresh("<html><body><p>hi</p></body></html>"), None);
        assert_eq!(extract_meta_refresh(r#"<meta http-equiv="refresh" content="30">"#), None);
    }

    #[test]
    fn test_offline_fetcher_fails() {
        let result = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(OfflineFetcher.fetch("http://example.com", &Configuration::default()));
        assert!(matches!(result, Err(BroadsheetError::FetchDisabled)));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_http_fetcher_connection_refused() {
        let config = Configuration::builder().request_timeout(2).build().unwrap();
        let result = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(HttpFetcher::new().fetch("http://127.0.0.1:1/article", &config));
        assert!(matches!(
            result,
            Err(BroadsheetError::HttpError(_)) | Err(BroadsheetError::Timeout { .. })
        ));
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_http_fetcher_rejects_bad_url() {
        let result = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(HttpFetcher::new().fetch("not-a-url", &Configuration::default()));
        assert!(matches!(result, Err(BroadsheetError::BadUrlFormat(_))));
    }
}
