//! rag-webcrawler: a single-site crawler that emits retrieval-ready chunks
//!
//! This crate crawls one website from a root URL under a global time/page/depth
//! budget, respecting robots.txt and per-host politeness limits, and writes
//! size-bounded text/code chunks as JSON Lines for downstream retrieval
//! indexing.

pub mod config;
pub mod content;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors, raised before any crawling starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("root URL must be an absolute http(s) URL with a host: {0}")]
    InvalidRootUrl(String),

    #[error("max_time must be positive")]
    NonPositiveMaxTime,

    #[error("max_pages must be > 0 when set")]
    NonPositiveMaxPages,

    #[error("per_host_concurrency must be > 0")]
    NonPositiveConcurrency,

    #[error("user_agent must not be blank")]
    BlankUserAgent,
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use content::{ExtractedDocument, LogicalBlock, OutputChunk};
pub use crawler::run_crawl;
