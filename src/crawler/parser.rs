//! HTML link extraction
//!
//! Collects raw anchor hrefs in document order. Resolution against the base
//! URL and same-host filtering are the normalizer's job, not the parser's.
//!
//! `scraper::Html` is not `Send`, so parsing stays inside synchronous
//! functions and never lives across an await point.

use scraper::{Html, Selector};

/// Extracts every non-empty `href` attribute of anchor elements, in document
/// order, without resolving or filtering them
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for anchor in document.select(&selector) {
            if let Some(href) = anchor.value().attr("href") {
                if !href.trim().is_empty() {
                    links.push(href.to_string());
                }
            }
        }
    }

    links
}
