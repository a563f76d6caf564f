//! Crawl configuration
//!
//! The configuration is assembled by the CLI layer in `main.rs` and validated
//! here before any crawling starts. Invalid values are fatal.

use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Default maximum crawl time in seconds
pub const DEFAULT_MAX_TIME_SECONDS: u64 = 20;

/// Default maximum concurrent requests per host
pub const DEFAULT_PER_HOST_CONCURRENCY: u32 = 4;

/// Default minimum delay between requests to one host, in milliseconds
pub const DEFAULT_PER_HOST_MIN_DELAY_MILLIS: u64 = 250;

/// Default User-Agent header value
pub const DEFAULT_USER_AGENT: &str = "rag-webcrawler/0.1";

/// Immutable crawl configuration
///
/// The root URL derives the same-host scope: only links whose scheme, host,
/// and effective port match the root are followed.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Absolute root URL to start crawling from
    pub root_url: Url,

    /// Maximum crawl duration (global deadline)
    pub max_time: Duration,

    /// Maximum number of pages to crawl, if bounded
    pub max_pages: Option<u32>,

    /// Maximum crawl depth from the root (0 = root only), if bounded
    pub max_depth: Option<u32>,

    /// Maximum concurrent in-flight requests per host
    pub per_host_concurrency: u32,

    /// Minimum delay between successive request starts on one host
    pub per_host_min_delay: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl CrawlConfig {
    /// Creates a configuration with default politeness limits
    pub fn new(root_url: Url, max_time: Duration) -> Self {
        Self {
            root_url,
            max_time,
            max_pages: None,
            max_depth: None,
            per_host_concurrency: DEFAULT_PER_HOST_CONCURRENCY,
            per_host_min_delay: Duration::from_millis(DEFAULT_PER_HOST_MIN_DELAY_MILLIS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Validates the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Configuration is usable
    /// * `Err(ConfigError)` - First constraint violated
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scheme = self.root_url.scheme();
        if (scheme != "http" && scheme != "https") || self.root_url.host_str().is_none() {
            return Err(ConfigError::InvalidRootUrl(self.root_url.to_string()));
        }

        if self.max_time.is_zero() {
            return Err(ConfigError::NonPositiveMaxTime);
        }

        if let Some(max_pages) = self.max_pages {
            if max_pages == 0 {
                return Err(ConfigError::NonPositiveMaxPages);
            }
        }

        if self.per_host_concurrency == 0 {
            return Err(ConfigError::NonPositiveConcurrency);
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::BlankUserAgent);
        }

        Ok(())
    }
}
