//! URL normalizer enforcing the same-host policy
//!
//! Canonicalizes URLs (fragment stripping plus the RFC 3986 path
//! normalization the `url` crate applies on parse) and decides whether a
//! discovered link stays inside the crawl scope derived from the root URL.

use url::Url;

/// Normalizes URLs and enforces the same-host policy derived from the root
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    root: Url,
    root_scheme: String,
    root_host: String,
    root_port: Option<u16>,
}

impl UrlNormalizer {
    /// Creates a normalizer scoped to the given root URL
    ///
    /// The root is expected to be an absolute http(s) URL with a host; config
    /// validation guarantees this before a normalizer is built.
    pub fn new(root: &Url) -> Self {
        Self {
            root: root.clone(),
            root_scheme: root.scheme().to_ascii_lowercase(),
            root_host: root.host_str().unwrap_or_default().to_string(),
            root_port: root.port_or_known_default(),
        }
    }

    /// Canonicalizes a URL: strips the fragment and renders the normalized form
    ///
    /// Normalization is idempotent: `normalize(normalize(u)) == normalize(u)`.
    pub fn normalize(&self, url: &Url) -> String {
        let mut url = url.clone();
        url.set_fragment(None);
        url.to_string()
    }

    /// Resolves a candidate link against the root and accepts it only if it
    /// stays on the root's scheme, host, and effective port
    ///
    /// Relative candidates are resolved against the root URL. Malformed
    /// candidates yield `None`, never an error.
    pub fn normalize_if_same_host(&self, candidate: &str) -> Option<String> {
        let absolute = self.root.join(candidate).ok()?;
        if !self.is_same_host(&absolute) {
            return None;
        }
        Some(self.normalize(&absolute))
    }

    fn is_same_host(&self, url: &Url) -> bool {
        url.scheme().eq_ignore_ascii_case(&self.root_scheme)
            && url.host_str() == Some(self.root_host.as_str())
            && url.port_or_known_default() == self.root_port
    }
}
