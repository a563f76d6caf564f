//! Shared crawl state: the frontier queue and the visited/dedup sets
//!
//! All of these are safe for unsynchronized concurrent access; they are the
//! sole synchronization points preventing duplicate page dispatch and
//! duplicate chunk emission.

mod frontier;
mod visited;

pub use frontier::{Frontier, Task};
pub use visited::{ContentDeduplicator, VisitedStore};
