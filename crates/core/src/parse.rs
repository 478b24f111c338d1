//! HTML document building.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! pipeline stages, and [`HtmlParser`], the stock [`Parser`] implementation.
//!
//! # Example
//!
//! ```rust
//! use broadsheet_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let paragraphs = doc.select("p.content").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::encoding::decode_html;
use crate::ports::Parser;
use crate::{BroadsheetError, Result};

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing is lenient: any input yields a tree, with missing `html`,
    /// `head` and `body` elements synthesized.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the underlying `scraper::Html` instance.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Gets the entire HTML as a string.
    pub fn as_string(&self) -> String {
        self.html.html()
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::HtmlParseError`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Gets the trimmed content of the `<title>` element, if non-empty.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Gets the `content` of a `<meta>` tag matched by `property` or `name`.
    pub fn meta_content(&self, key: &str) -> Option<String> {
        let selector = Selector::parse("meta").ok()?;
        self.html
            .select(&selector)
            .find(|el| {
                let value = el.value();
                value.attr("property").is_some_and(|p| p.eq_ignore_ascii_case(key))
                    || value.attr("name").is_some_and(|n| n.eq_ignore_ascii_case(key))
            })
            .and_then(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
    }

    /// Gets the `<body>` element, if present.
    pub fn body(&'_ self) -> Option<Element<'_>> {
        let selector = Selector::parse("body").ok()?;
        self.html.select(&selector).next().map(Element::new)
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Gets the wrapped scraper element.
    pub fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Gets the inner HTML of this element.
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Gets the text content of this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Gets the parent element, if the parent is an element.
    pub fn parent(&self) -> Option<Element<'a>> {
        self.element.parent().and_then(ElementRef::wrap).map(Element::new)
    }

    /// Gets the direct child elements.
    pub fn child_elements(&self) -> Vec<Element<'a>> {
        self.element.children().filter_map(ElementRef::wrap).map(Element::new).collect()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`BroadsheetError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(Element::new).collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| BroadsheetError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// The stock [`Parser`]: `scraper` for trees, `encoding_rs` for bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for HtmlParser {
    /// Returns `None` for blank input and for markup whose body holds
    /// neither text nor elements.
    fn build_document(&self, html: &str) -> Option<Document> {
        if html.trim().is_empty() {
            return None;
        }

        let document = Document::parse(html);
        let has_content = match document.body() {
            Some(body) => {
                !body.child_elements().is_empty() || body.element_ref().text().any(|t| !t.trim().is_empty())
            }
            None => document.text_content().chars().any(|c| !c.is_whitespace()),
        };

        has_content.then_some(document)
    }

    fn decode_bytes(&self, bytes: &[u8]) -> String {
        decode_html(bytes)
    }
}
