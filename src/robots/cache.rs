//! Per-host robots.txt cache
//!
//! Rules are fetched lazily on first need for a host and cached for the run.
//! The fetch goes directly through the HTTP fetcher, bypassing the per-host
//! scheduler: robots fetches are not politeness-limited. Any non-2xx response
//! or error fails open to an allow-all ruleset.

use crate::crawler::HttpFetcher;
use crate::robots::parser::{self, RobotsRules};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

/// Caches parsed robots.txt rules per `scheme://host`
pub struct RobotsCache {
    cache: DashMap<String, Arc<OnceCell<Arc<RobotsRules>>>>,
    fetcher: Arc<HttpFetcher>,
    user_agent: String,
}

impl RobotsCache {
    pub fn new(fetcher: Arc<HttpFetcher>, user_agent: String) -> Self {
        Self {
            cache: DashMap::new(),
            fetcher,
            user_agent,
        }
    }

    /// Returns the cached rules for the URL's host, fetching them on first use
    ///
    /// Concurrent first requests for one host share a single fetch.
    pub async fn rules_for(&self, url: &Url) -> Arc<RobotsRules> {
        let cell = self
            .cache
            .entry(host_key(url))
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_init(|| self.fetch_rules(url)).await.clone()
    }

    async fn fetch_rules(&self, url: &Url) -> Arc<RobotsRules> {
        let mut robots_url = url.clone();
        robots_url.set_path("/robots.txt");
        robots_url.set_query(None);
        robots_url.set_fragment(None);

        let rules = match self.fetcher.fetch(&robots_url).await {
            Ok(response) if (200..300).contains(&response.status) => {
                tracing::debug!("Fetched robots.txt for {}", host_key(url));
                parser::parse(&response.body, &self.user_agent)
            }
            Ok(response) => {
                tracing::debug!(
                    "robots.txt for {} returned HTTP {}; allowing all",
                    host_key(url),
                    response.status
                );
                RobotsRules::allow_all()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch robots.txt for {}: {}", host_key(url), e);
                RobotsRules::allow_all()
            }
        };
        Arc::new(rules)
    }
}

fn host_key(url: &Url) -> String {
    format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_key_ignores_path_and_query() {
        let a = Url::parse("https://ex.com/a/b?q=1").unwrap();
        let b = Url::parse("https://ex.com/other").unwrap();
        assert_eq!(host_key(&a), host_key(&b));
        assert_eq!(host_key(&a), "https://ex.com");
    }

    #[test]
    fn test_host_key_distinguishes_scheme() {
        let a = Url::parse("https://ex.com/").unwrap();
        let b = Url::parse("http://ex.com/").unwrap();
        assert_ne!(host_key(&a), host_key(&b));
    }
}
