//! Crawl orchestration
//!
//! A single dispatch loop drives the frontier and spawns one task per
//! accepted URL; task fan-out is bounded indirectly by the per-host
//! scheduler, not a worker pool. The loop polls non-blockingly and sleeps a
//! short fixed interval when the frontier is empty but tasks are in flight.
//!
//! Cancellation is cooperative: a shared flag checked at the top of the
//! loop, at scheduler admission, inside the fetcher, and before each
//! discovered-link enqueue. It is set on deadline expiry, on reaching the
//! page budget, and by the fetcher when it observes either condition.

use crate::config::CrawlConfig;
use crate::content::{chunk, extract};
use crate::crawler::parser::extract_links;
use crate::crawler::scheduler::PerHostScheduler;
use crate::crawler::HttpFetcher;
use crate::output::JsonlChunkWriter;
use crate::robots::{RobotsCache, RobotsPolicy};
use crate::state::{ContentDeduplicator, Frontier, Task, VisitedStore};
use crate::url::UrlNormalizer;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Sleep interval for the dispatch loop while waiting on in-flight tasks
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything one page task needs, shared behind a single Arc
struct CrawlContext {
    config: CrawlConfig,
    deadline: Instant,
    cancelled: Arc<AtomicBool>,
    normalizer: UrlNormalizer,
    frontier: Frontier,
    visited: VisitedStore,
    deduplicator: ContentDeduplicator,
    robots: RobotsPolicy,
    scheduler: PerHostScheduler,
    fetcher: Arc<HttpFetcher>,
    writer: JsonlChunkWriter,
    pages_crawled: AtomicU32,
    in_flight: AtomicU32,
}

impl CrawlContext {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn page_budget_reached(&self) -> bool {
        match self.config.max_pages {
            Some(max) => self.pages_crawled.load(Ordering::SeqCst) >= max,
            None => false,
        }
    }
}

/// Runs a crawl to completion and returns the number of pages crawled
///
/// The crawl terminates when the frontier is exhausted with no tasks in
/// flight, when the global deadline elapses, or when the page budget is
/// reached. Individual page failures are logged and do not surface here.
pub async fn run_crawl(config: CrawlConfig, output_path: &Path) -> crate::Result<u32> {
    config.validate()?;

    let deadline = Instant::now() + config.max_time;
    let cancelled = Arc::new(AtomicBool::new(false));
    let fetcher = Arc::new(HttpFetcher::new(&config, deadline, cancelled.clone())?);
    let writer = JsonlChunkWriter::create(output_path).await?;

    let ctx = Arc::new(CrawlContext {
        normalizer: UrlNormalizer::new(&config.root_url),
        frontier: Frontier::new(),
        visited: VisitedStore::new(),
        deduplicator: ContentDeduplicator::new(),
        robots: RobotsPolicy::new(RobotsCache::new(
            fetcher.clone(),
            config.user_agent.clone(),
        )),
        scheduler: PerHostScheduler::new(
            config.per_host_concurrency,
            config.per_host_min_delay,
            deadline,
            cancelled.clone(),
        ),
        fetcher,
        writer,
        deadline,
        cancelled,
        pages_crawled: AtomicU32::new(0),
        in_flight: AtomicU32::new(0),
        config,
    });

    let root = ctx.normalizer.normalize(&ctx.config.root_url);
    ctx.frontier.offer(Task::new(root, 0));

    tracing::info!(
        "Starting crawl: root={} max_time={:?} max_pages={:?} max_depth={:?}",
        ctx.config.root_url,
        ctx.config.max_time,
        ctx.config.max_pages,
        ctx.config.max_depth
    );

    dispatch_loop(&ctx).await;
    drain_in_flight(&ctx).await;

    let pages = ctx.pages_crawled.load(Ordering::SeqCst);
    tracing::info!("Crawl finished: pages_crawled={}", pages);
    Ok(pages)
}

/// The dispatch loop: frontier consumption, admission gates, task fan-out
async fn dispatch_loop(ctx: &Arc<CrawlContext>) {
    loop {
        if ctx.is_cancelled() {
            break;
        }
        if Instant::now() >= ctx.deadline {
            tracing::info!("Global deadline reached; stopping crawl loop");
            ctx.cancel();
            break;
        }
        if ctx.page_budget_reached() {
            tracing::info!(
                "Reached max_pages {}; stopping crawl loop",
                ctx.config.max_pages.unwrap_or_default()
            );
            ctx.cancel();
            break;
        }

        let Some(task) = ctx.frontier.poll() else {
            if ctx.in_flight.load(Ordering::SeqCst) == 0 {
                tracing::info!("Frontier empty and no in-flight tasks; crawl complete");
                break;
            }
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
            continue;
        };

        if let Some(max_depth) = ctx.config.max_depth {
            if task.depth > max_depth {
                continue;
            }
        }
        if !ctx.visited.mark_visited(&task.url) {
            continue;
        }
        if ctx.page_budget_reached() {
            continue;
        }

        ctx.in_flight.fetch_add(1, Ordering::SeqCst);
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = crawl_page(&ctx, &task).await {
                tracing::warn!("Error while crawling {}: {}", task.url, e);
            }
            ctx.in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }
}

/// Waits for in-flight tasks to finish, giving up if the deadline passes
///
/// Cancellation alone does not cut the wait short: tasks started before a
/// budget stop still get to finish their writes before the run returns.
async fn drain_in_flight(ctx: &CrawlContext) {
    while ctx.in_flight.load(Ordering::SeqCst) > 0 {
        if Instant::now() >= ctx.deadline {
            tracing::info!("Deadline reached while waiting for tasks; setting cancelled");
            ctx.cancel();
            break;
        }
        tokio::time::sleep(IDLE_POLL_INTERVAL).await;
    }
}

/// Processes one accepted URL end to end
///
/// Any error here is caught at the task boundary in the dispatch loop;
/// failures abandon this page without affecting other tasks.
async fn crawl_page(ctx: &CrawlContext, task: &Task) -> crate::Result<()> {
    if ctx.is_cancelled() {
        return Ok(());
    }
    if Instant::now() >= ctx.deadline {
        ctx.cancel();
        return Ok(());
    }

    let url = Url::parse(&task.url)?;

    if !ctx.robots.is_allowed(&url).await {
        tracing::debug!("URL {} disallowed by robots.txt", task.url);
        return Ok(());
    }

    if !ctx.scheduler.before_request(&url).await {
        return Ok(());
    }

    let response = ctx.fetcher.fetch(&url).await?;
    if !response.is_success_html() {
        tracing::debug!(
            "Skipping {} (status {}, content-type {:?})",
            task.url,
            response.status,
            response.content_type
        );
        return Ok(());
    }

    let page_index = ctx.pages_crawled.fetch_add(1, Ordering::SeqCst) + 1;

    // scraper's DOM types are not Send; extraction and link collection run
    // synchronously between awaits.
    let doc = extract(&response.body, &task.url, &response.effective_url, task.depth);
    let chunks = chunk(&doc);
    let links = extract_links(&response.body);

    for chunk in &chunks {
        if ctx.deduplicator.is_duplicate(&chunk.chunk_hash) {
            continue;
        }
        ctx.writer.write_chunk(chunk).await?;
    }
    tracing::debug!(
        "Crawled {} (depth {}): {} chunks, {} links",
        task.url,
        task.depth,
        chunks.len(),
        links.len()
    );

    if let Some(max_pages) = ctx.config.max_pages {
        if page_index >= max_pages {
            ctx.cancel();
        }
    }

    let next_depth = task.depth + 1;
    for link in links {
        if ctx.is_cancelled() {
            break;
        }
        let Some(normalized) = ctx.normalizer.normalize_if_same_host(&link) else {
            continue;
        };
        if let Some(max_depth) = ctx.config.max_depth {
            if next_depth > max_depth {
                continue;
            }
        }
        ctx.frontier.offer(Task::new(normalized, next_depth));
    }

    Ok(())
}
