//! Add-only concurrent sets for visited URLs and emitted chunk hashes

use dashmap::DashSet;

/// Set of normalized URLs already dispatched; prevents re-enqueue
///
/// Entries are never removed for the lifetime of the run.
#[derive(Debug, Default)]
pub struct VisitedStore {
    visited: DashSet<String>,
}

impl VisitedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the URL as visited if not already present
    ///
    /// Returns true iff this call was the first to add it; concurrent calls
    /// with the same URL yield exactly one true.
    pub fn mark_visited(&self, normalized_url: &str) -> bool {
        self.visited.insert(normalized_url.to_string())
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Set of content-chunk fingerprints already emitted
#[derive(Debug, Default)]
pub struct ContentDeduplicator {
    hashes: DashSet<String>,
}

impl ContentDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the hash and reports whether it was already present
    pub fn is_duplicate(&self, hash: &str) -> bool {
        !self.hashes.insert(hash.to_string())
    }
}
