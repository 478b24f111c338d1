//! Source origin and article URL resolution.
//!
//! Every article is identified by the origin of the site that owns it
//! (`scheme://domain`) and an absolute URL resolved against that origin.

use url::Url;

use crate::{BroadsheetError, Result};

/// Scheme assumed when the input URL does not carry one.
pub const DEFAULT_SCHEME: &str = "http";

/// The resolved identity of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Origin of the owning site, `scheme://domain`.
    pub source_url: String,
    /// Absolute article URL.
    pub url: String,
}

/// Returns the explicit scheme of `url`, if it has one.
///
/// Only a `scheme://` prefix counts, so `example.com:8080/a` has no scheme.
pub fn get_scheme(url: &str) -> Option<String> {
    let (scheme, _) = url.trim().split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}

/// Returns the domain (host and optional port) of `url`, or an empty string.
///
/// Scheme-less input such as `example.com/a` is accepted when its first
/// segment looks like a host name.
pub fn get_domain(url: &str) -> String {
    parse_loose(url)
        .and_then(|parsed| {
            let host = parsed.host_str()?.to_string();
            Some(match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            })
        })
        .unwrap_or_default()
}

/// Resolves `url` to an absolute URL against `source_url`.
///
/// # Errors
///
/// Returns [`BroadsheetError::BadUrlFormat`] when neither `url` nor the join
/// of `url` onto `source_url` yields an absolute URL.
pub fn prepare_url(url: &str, source_url: &str) -> Result<String> {
    let url = url.trim();

    if get_scheme(url).is_some()
        && let Some(parsed) = parse_loose(url)
    {
        return Ok(parsed.to_string());
    }

    let host_form = parse_loose(url);
    let base = match Url::parse(source_url) {
        Ok(base) => base,
        Err(e) => {
            return host_form
                .map(|parsed| parsed.to_string())
                .ok_or_else(|| BroadsheetError::BadUrlFormat(format!("source url {:?}: {}", source_url, e)));
        }
    };

    // A scheme-less URL naming the source host is absolute, anything else is relative to the source.
    if let Some(mut parsed) = host_form
        && parsed.host_str() == base.host_str()
    {
        if parsed.set_scheme(base.scheme()).is_err() {
            return Err(BroadsheetError::BadUrlFormat(format!("cannot apply scheme {:?}", base.scheme())));
        }
        return Ok(parsed.to_string());
    }

    let joined = base
        .join(url)
        .map_err(|e| BroadsheetError::BadUrlFormat(format!("{:?} against {:?}: {}", url, source_url, e)))?;

    if joined.cannot_be_a_base() || !joined.has_host() {
        return Err(BroadsheetError::BadUrlFormat(format!("{:?} is not a hierarchical url", joined.as_str())));
    }
    Ok(joined.to_string())
}

/// Resolves the source origin and absolute URL for an article.
///
/// A non-empty `source_url` is used verbatim. Otherwise the origin is
/// derived from the scheme (default [`DEFAULT_SCHEME`]) and domain of `url`.
///
/// # Errors
///
/// Returns [`BroadsheetError::BadUrlFormat`] when no non-empty origin can be
/// derived or the URL cannot be made absolute.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::source::resolve_source;
///
/// let resolved = resolve_source("http://example.com/a", None).unwrap();
/// assert_eq!(resolved.source_url, "http://example.com");
/// assert_eq!(resolved.url, "http://example.com/a");
/// ```
pub fn resolve_source(url: &str, source_url: Option<&str>) -> Result<ResolvedSource> {
    let source_url = match source_url.map(str::trim).filter(|s| !s.is_empty()) {
        Some(given) => given.to_string(),
        None => {
            let domain = get_domain(url);
            if domain.is_empty() {
                String::new()
            } else {
                let scheme = get_scheme(url).unwrap_or_else(|| DEFAULT_SCHEME.to_string());
                format!("{}://{}", scheme, domain)
            }
        }
    };

    if source_url.is_empty() {
        return Err(BroadsheetError::BadUrlFormat(format!("cannot derive a source from {:?}", url)));
    }

    let url = prepare_url(url, &source_url)?;
    Ok(ResolvedSource { source_url, url })
}

/// Parses an absolute URL, or a scheme-less one whose first segment is a host.
fn parse_loose(url: &str) -> Option<Url> {
    let url = url.trim();
    if url.is_empty() || url.chars().any(char::is_whitespace) {
        return None;
    }

    if get_scheme(url).is_some() {
        return Url::parse(url).ok().filter(|parsed| parsed.has_host());
    }

    if url.starts_with('/') || url.starts_with('.') || url.starts_with('?') || url.starts_with('#') {
        return None;
    }

    let first_segment = url.split(['/', '?', '#']).next().unwrap_or_default();
    let host = first_segment.split(':').next().unwrap_or_default();
    if !looks_like_host(host) {
        return None;
    }

    Url::parse(&format!("{}://{}", DEFAULT_SCHEME, url)).ok().filter(|parsed| parsed.has_host())
}

fn looks_like_host(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://example.com/a", Some("http"))]
    #[case("HTTPS://example.com/a", Some("https"))]
    #[case("example.com/a", None)]
    #[case("example.com:8080/a", None)]
    #[case("/relative/path", None)]
    fn test_get_scheme(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(get_scheme(url).as_deref(), expected);
    }

    #[rstest]
    #[case("http://example.com/a", "example.com")]
    #[case("https://news.example.co.uk/story?id=1", "news.example.co.uk")]
    #[case("http://localhost:8080/a", "localhost:8080")]
    #[case("example.com/a", "example.com")]
    #[case("garbage", "")]
    #[case("", "")]
    #[case("not a url", "")]
    #[case("/only/a/path", "")]
    fn test_get_domain(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(get_domain(url), expected);
    }

    #[test]
    fn test_resolve_with_scheme() {
        let resolved = resolve_source("http://example.com/a", None).unwrap();
        assert_eq!(resolved.source_url, "http://example.com");
        assert_eq!(resolved.url, "http://example.com/a");
    }

    #[test]
    fn test_resolve_defaults_to_http() {
        let resolved = resolve_source("example.com/a", None).unwrap();
        assert_eq!(resolved.source_url, "http://example.com");
        assert_eq!(resolved.url, "http://example.com/a");
    }

    #[test]
    fn test_resolve_empty_source_is_sentinel() {
        let resolved = resolve_source("https://example.com/a", Some("")).unwrap();
        assert_eq!(resolved.source_url, "https://example.com");
    }

    #[test]
    fn test_resolve_pins_given_source() {
        let resolved = resolve_source("https://wire.example.net/story/9", Some("https://paper.example.org")).unwrap();
        assert_eq!(resolved.source_url, "https://paper.example.org");
        assert_eq!(resolved.url, "https://wire.example.net/story/9");
    }

    #[test]
    fn test_resolve_relative_against_source() {
        let resolved = resolve_source("/politics/story.html", Some("https://example.com")).unwrap();
        assert_eq!(resolved.source_url, "https://example.com");
        assert_eq!(resolved.url, "https://example.com/politics/story.html");
    }

    #[rstest]
    #[case("")]
    #[case("garbage")]
    #[case("not a url")]
    #[case("/relative/without/source")]
    fn test_resolve_bad_format(#[case] url: &str) {
        assert!(matches!(resolve_source(url, None), Err(BroadsheetError::BadUrlFormat(_))));
    }

    #[test]
    fn test_prepare_url_rejects_unusable_source() {
        assert!(matches!(
            prepare_url("/story.html", "not-a-base"),
            Err(BroadsheetError::BadUrlFormat(_))
        ));
    }

    #[test]
    fn test_prepare_url_relative_file_name() {
        let url = prepare_url("story.html", "https://example.com/section/").unwrap();
        assert_eq!(url, "https://example.com/section/story.html");
    }

    #[test]
    fn test_prepare_url_scheme_less_source_host() {
        let url = prepare_url("example.com/a", "https://example.com").unwrap();
        assert_eq!(url, "https://example.com/a");
    }
}
