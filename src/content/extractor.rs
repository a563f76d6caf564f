//! Content extractor: HTML page to an ordered list of typed logical blocks
//!
//! Blocks are collected by type, not document position: every heading first,
//! then every paragraph, then every list, then every code element, each group
//! in document order. That grouping directly determines chunk packing order
//! downstream and must be preserved.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Semantic type of one extracted content unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Heading,
    Paragraph,
    List,
    Code,
}

impl BlockType {
    /// Lowercase tag used in output records
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Heading => "heading",
            BlockType::Paragraph => "paragraph",
            BlockType::List => "list",
            BlockType::Code => "code",
        }
    }
}

/// One semantically typed unit of extracted content, prior to chunk packing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalBlock {
    pub kind: BlockType,
    pub text: String,
    /// Language hint for code blocks, taken from the element's class attribute
    pub code_language: Option<String>,
}

/// Everything extracted from one fetched page
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Final URL after redirects
    pub url: String,
    /// First `rel=canonical` link in absolute form, if present
    pub canonical_url: Option<String>,
    /// URL the page was requested as
    pub root_url: String,
    pub title: String,
    pub headings: Vec<String>,
    pub blocks: Vec<LogicalBlock>,
    pub depth: u32,
    pub crawled_at: DateTime<Utc>,
}

/// Extracts title, canonical link, headings, and typed blocks from a page
pub fn extract(html: &str, url: &str, effective_url: &Url, depth: u32) -> ExtractedDocument {
    let document = Html::parse_document(html);

    let title = select_first_text(&document, "title").unwrap_or_default();
    let canonical_url = canonical_link(&document, effective_url);

    let mut headings = Vec::new();
    let mut blocks = Vec::new();

    for_each_selected(&document, "h1, h2, h3, h4", |element| {
        let text = collapsed_text(element);
        if !text.is_empty() {
            headings.push(text.clone());
            blocks.push(LogicalBlock {
                kind: BlockType::Heading,
                text,
                code_language: None,
            });
        }
    });

    for_each_selected(&document, "p", |element| {
        let text = collapsed_text(element);
        if !text.is_empty() {
            blocks.push(LogicalBlock {
                kind: BlockType::Paragraph,
                text,
                code_language: None,
            });
        }
    });

    for_each_selected(&document, "ul, ol", |element| {
        let text = collapsed_text(element);
        if !text.is_empty() {
            blocks.push(LogicalBlock {
                kind: BlockType::List,
                text,
                code_language: None,
            });
        }
    });

    for_each_selected(&document, "pre, code", |element| {
        let text = raw_text(element);
        if text.is_empty() {
            return;
        }
        let code_language = element
            .value()
            .attr("class")
            .map(str::trim)
            .filter(|class| !class.is_empty())
            .map(str::to_string);
        blocks.push(LogicalBlock {
            kind: BlockType::Code,
            text,
            code_language,
        });
    });

    ExtractedDocument {
        url: effective_url.to_string(),
        canonical_url,
        root_url: url.to_string(),
        title,
        headings,
        blocks,
        depth,
        crawled_at: Utc::now(),
    }
}

fn for_each_selected<F: FnMut(ElementRef)>(document: &Html, selector: &str, mut f: F) {
    if let Ok(selector) = Selector::parse(selector) {
        for element in document.select(&selector) {
            f(element);
        }
    }
}

fn select_first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(collapsed_text)
        .filter(|text| !text.is_empty())
}

/// First `rel=canonical` href, resolved to absolute form against the page URL
fn canonical_link(document: &Html, base: &Url) -> Option<String> {
    let selector = Selector::parse(r#"link[rel="canonical"]"#).ok()?;
    let href = document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))?;
    base.join(href).ok().map(|url| url.to_string())
}

/// Element text with runs of whitespace collapsed to single spaces
///
/// Text nodes are joined with a space first, so sibling elements with no
/// whitespace between them (`<li>a</li><li>b</li>`) stay separated.
fn collapsed_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Element text with its original formatting, trimmed; used for code blocks
fn raw_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
