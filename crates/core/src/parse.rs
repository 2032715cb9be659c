//! HTML parsing and element handles.
//!
//! Parsing is delegated to `scraper` (html5ever), which recovers from any
//! malformed markup. Extraction only ever reads the resulting tree; the
//! article body it returns is an [`Element`] borrowed from the [`Document`].
//!
//! # Example
//!
//! ```rust
//! use marrow_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head><title> Harbor Notes </title></head>
//!         <body><p class="content">Paragraph</p></body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.title().as_deref(), Some("Harbor Notes"));
//! assert!(doc.body().is_some());
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{MarrowError, Result};

/// A parsed HTML document, the owner of every [`Element`] handed out.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a complete HTML document.
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self { html: Html::parse_document(html) })
    }

    /// The `<html>` element.
    pub fn root_element(&self) -> Element<'_> {
        Element::new(self.html.root_element())
    }

    /// The first `<body>` element. Absent for frameset documents.
    pub fn body(&self) -> Option<Element<'_>> {
        self.select("body").ok()?.into_iter().next()
    }

    /// Elements matching a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`MarrowError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel =
            Selector::parse(selector).map_err(|e| MarrowError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Trimmed text of the first `<title>`, used to spot duplicated headlines.
    pub fn title(&self) -> Option<String> {
        let title = self.select("title").ok()?.into_iter().next()?;
        Some(title.text().trim().to_string())
    }
}

/// Handle to one element of a [`Document`].
///
/// Two handles are equal when they point at the same node, not when their
/// markup happens to match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// The underlying scraper reference.
    pub fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Serialized markup of the element including its own tag.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Own and descendant text, concatenated as-is.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }
}
