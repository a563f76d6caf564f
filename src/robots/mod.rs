//! Robots.txt fetching, parsing, caching, and the allow/deny policy

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{parse, RobotsRules};

use url::Url;

/// Answers allow/deny for request URLs using the per-host rules cache
pub struct RobotsPolicy {
    cache: RobotsCache,
}

impl RobotsPolicy {
    pub fn new(cache: RobotsCache) -> Self {
        Self { cache }
    }

    /// Checks the URL's path against the cached ruleset for its host
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let rules = self.cache.rules_for(url).await;
        let path = url.path();
        let path = if path.is_empty() { "/" } else { path };
        rules.is_allowed(path)
    }
}
