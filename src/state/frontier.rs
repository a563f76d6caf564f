//! The URL frontier: a FIFO queue of not-yet-dispatched crawl tasks

use std::collections::VecDeque;
use std::sync::Mutex;

/// A crawl task: a normalized URL plus its root-relative depth (root = 0)
///
/// Immutable once created; consumed exactly once by the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub url: String,
    pub depth: u32,
}

impl Task {
    pub fn new(url: String, depth: u32) -> Self {
        Self { url, depth }
    }
}

/// Unbounded FIFO frontier, safe for concurrent producers and consumers
///
/// `offer` is non-blocking and always succeeds; `poll` returns immediately.
/// The dispatch loop treats "empty with no in-flight tasks" as crawl
/// completion and "empty with in-flight tasks" as wait-and-retry.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<Task>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a task at the tail of the frontier
    pub fn offer(&self, task: Task) {
        self.queue.lock().unwrap().push_back(task);
    }

    /// Dequeues the next task, or `None` if the frontier is empty
    pub fn poll(&self) -> Option<Task> {
        self.queue.lock().unwrap().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
