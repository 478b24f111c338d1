//! Character encoding detection and transcoding.
//!
//! Raw response bodies are decoded in this order: byte order mark, a charset
//! declared in the first kilobyte of markup, valid UTF-8, and finally a
//! statistical guess from `chardetng`.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// How many leading bytes are searched for a charset declaration.
const SNIFF_LEN: usize = 1024;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s/>;]+)"#).expect("valid regex"));

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>;]+)"#)
        .expect("valid regex")
});

/// Detects the character encoding of an HTML body.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(SNIFF_LEN)]);
    let declared = CONTENT_TYPE_CHARSET_RE
        .captures(&head)
        .or_else(|| CHARSET_META_RE.captures(&head))
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().trim().as_bytes()));

    if let Some(encoding) = declared {
        // A page cannot truthfully declare UTF-16 in ASCII-compatible markup.
        if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
            return UTF_8;
        }
        return encoding;
    }

    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decodes an HTML body to a UTF-8 string.
///
/// Undecodable sequences are replaced with U+FFFD rather than failing.
///
/// # Example
///
/// ```rust
/// use broadsheet_core::encoding::decode_html;
///
/// let latin1 = b"<meta charset=\"iso-8859-1\"><p>caf\xe9</p>";
/// assert!(decode_html(latin1).contains("caf\u{e9}"));
/// ```
pub fn decode_html(bytes: &[u8]) -> String {
    let encoding = detect_encoding(bytes);
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_meta_charset() {
        let html = br#"<html><head><meta charset="windows-1252"></head><body>Test</body></html>"#;
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn test_detect_from_content_type() {
        let html = br#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1"></head></html>"#;
        // encoding_rs maps ISO-8859-1 to windows-1252 per WHATWG
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn test_default_utf8() {
        assert_eq!(detect_encoding(b"<html><body>plain</body></html>"), UTF_8);
    }

    #[test]
    fn test_bom_wins() {
        let mut html = vec![0xEF, 0xBB, 0xBF];
        html.extend_from_slice(br#"<meta charset="windows-1252"><p>x</p>"#);
        assert_eq!(detect_encoding(&html), UTF_8);
    }

    #[test]
    fn test_decode_undeclared_latin1() {
        let body = b"<html><body><p>Der B\xe4r schl\xe4ft im Wald und tr\xe4umt von M\xfcnchen.</p></body></html>";
        let decoded = decode_html(body);
        assert!(decoded.contains("B\u{e4}r"));
        assert!(!decoded.contains('\u{fffd}'));
    }

    #[test]
    fn test_decode_shift_jis() {
        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode("<meta charset=\"shift_jis\"><p>日本語</p>");
        assert!(decode_html(&encoded).contains("日本語"));
    }
}
