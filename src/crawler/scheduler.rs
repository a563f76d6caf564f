//! Per-host politeness scheduler
//!
//! For each host key `(scheme, host, effective port)` this bounds concurrent
//! admissions to `per_host_concurrency` and enforces a minimum gap between
//! successive request starts. The delay is served while holding a host
//! permit, so at most `per_host_concurrency` requests can be catching up on
//! the delay at once. Best-effort fairness: no ordering guarantee across
//! waiting tasks beyond whichever wakes first.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use url::Url;

struct HostState {
    semaphore: Semaphore,
    last_request: Mutex<Option<Instant>>,
}

/// Admission control for outgoing page requests
pub struct PerHostScheduler {
    max_per_host: u32,
    min_delay: Duration,
    deadline: Instant,
    cancelled: Arc<AtomicBool>,
    hosts: DashMap<String, Arc<HostState>>,
}

impl PerHostScheduler {
    pub fn new(
        max_per_host: u32,
        min_delay: Duration,
        deadline: Instant,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            max_per_host,
            min_delay,
            deadline,
            cancelled,
            hosts: DashMap::new(),
        }
    }

    /// Admits one request start for the URL's host
    ///
    /// Blocks the calling task on the host permit and on the remaining
    /// minimum-delay gap. Returns false, and the caller must abandon the
    /// request, if the run is cancelled or the global deadline has passed at
    /// admission time.
    pub async fn before_request(&self, url: &Url) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return false;
        }

        let state = self
            .hosts
            .entry(host_key(url))
            .or_insert_with(|| {
                Arc::new(HostState {
                    semaphore: Semaphore::new(self.max_per_host as usize),
                    last_request: Mutex::new(None),
                })
            })
            .clone();

        let Ok(_permit) = state.semaphore.acquire().await else {
            return false;
        };

        if self.cancelled.load(Ordering::SeqCst) || Instant::now() >= self.deadline {
            self.cancelled.store(true, Ordering::SeqCst);
            return false;
        }

        let wait = {
            let last = state.last_request.lock().unwrap();
            match *last {
                Some(previous) => {
                    let elapsed = Instant::now().duration_since(previous);
                    self.min_delay.saturating_sub(elapsed)
                }
                None => Duration::ZERO,
            }
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        *state.last_request.lock().unwrap() = Some(Instant::now());
        true
    }
}

fn host_key(url: &Url) -> String {
    format!(
        "{}://{}:{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.port_or_known_default().unwrap_or_default()
    )
}
