//! Crawl orchestration: the dispatch loop, per-page tasks, the HTTP fetch
//! layer, the per-host politeness scheduler, and link extraction

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::run_crawl;
pub use fetcher::{FetchError, HttpFetcher, Response};
pub use parser::extract_links;
pub use scheduler::PerHostScheduler;
