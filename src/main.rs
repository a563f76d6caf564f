//! rag-webcrawler command-line entry point

use anyhow::Context;
use clap::Parser;
use rag_webcrawler::config::{
    CrawlConfig, DEFAULT_MAX_TIME_SECONDS, DEFAULT_PER_HOST_CONCURRENCY,
    DEFAULT_PER_HOST_MIN_DELAY_MILLIS, DEFAULT_USER_AGENT,
};
use rag_webcrawler::run_crawl;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Crawl a single website into JSON Lines chunks for retrieval indexing
///
/// The crawler stays on the root URL's host, respects robots.txt and
/// per-host politeness limits, and stops at the configured time, page, or
/// depth budget.
#[derive(Parser, Debug)]
#[command(name = "rag-webcrawler")]
#[command(version)]
#[command(about = "Crawl a single website into retrieval-ready JSONL chunks", long_about = None)]
struct Cli {
    /// Root URL to crawl; only links on the same host are followed
    #[arg(long)]
    url: Url,

    /// Output JSON Lines file path
    #[arg(long)]
    output: PathBuf,

    /// Maximum crawl time in seconds
    #[arg(long, default_value_t = DEFAULT_MAX_TIME_SECONDS)]
    max_time: u64,

    /// Maximum number of pages to crawl
    #[arg(long)]
    max_pages: Option<u32>,

    /// Maximum crawl depth from the root (0 = only the root page)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum concurrent requests per host
    #[arg(long, default_value_t = DEFAULT_PER_HOST_CONCURRENCY)]
    per_host_concurrency: u32,

    /// Minimum delay between requests to one host, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PER_HOST_MIN_DELAY_MILLIS)]
    per_host_min_delay_millis: u64,

    /// User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> (CrawlConfig, PathBuf) {
        let config = CrawlConfig {
            root_url: self.url,
            max_time: Duration::from_secs(self.max_time),
            max_pages: self.max_pages,
            max_depth: self.max_depth,
            per_host_concurrency: self.per_host_concurrency,
            per_host_min_delay: Duration::from_millis(self.per_host_min_delay_millis),
            user_agent: self.user_agent,
        };
        (config, self.output)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let (config, output) = cli.into_config();
    config
        .validate()
        .context("invalid crawl configuration")?;

    let pages = run_crawl(config, &output)
        .await
        .context("crawl failed")?;

    println!("Crawled {} pages -> {}", pages, output.display());
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rag_webcrawler=info,warn"),
            1 => EnvFilter::new("rag_webcrawler=debug,info"),
            2 => EnvFilter::new("rag_webcrawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
