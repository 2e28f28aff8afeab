//! Work queue for visit tasks
//!
//! This module handles:
//! - The `CrawlTarget` values flowing between visits
//! - A FIFO of visit tasks drained by a runner under a concurrency limit
//! - Tracking in-flight tasks so a run can wait for the crawl to drain
//! - A ceiling on how many tasks one run accepts
//!
//! A visit never calls itself: it enqueues its children here and returns.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::{mpsc, Notify, Semaphore};
use tokio::task::JoinHandle;
use url::Url;

/// A URL to visit, with the seed site it was reached from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// The page to fetch
    pub url: Url,

    /// The seed site whose expansion discovered this page
    pub origin_site: Url,

    /// Navigation hops from the seed (0 for the seed itself)
    pub depth: u32,
}

impl CrawlTarget {
    /// Creates the target for a seed site
    pub fn seed(url: Url) -> Self {
        Self {
            origin_site: url.clone(),
            url,
            depth: 0,
        }
    }

    /// Creates the target for a navigation link found on this page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            origin_site: self.origin_site.clone(),
            depth: self.depth + 1,
        }
    }
}

/// Queue lane a task runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Dedicated lane for crawl visits
    WebCrawler,
}

impl Lane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebCrawler => "web_crawler",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued `visit` call
#[derive(Debug, Clone)]
pub struct VisitTask {
    pub target: CrawlTarget,
    pub lane: Lane,
}

/// Errors returned when a task cannot be enqueued
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Work queue is closed")]
    Closed,

    #[error("Work queue accepted its limit of {limit} tasks")]
    CapacityReached { limit: u32 },
}

/// Something that accepts visit tasks
#[async_trait]
pub trait WorkQueue: Send + Sync {
    async fn enqueue(&self, target: CrawlTarget, lane: Lane) -> Result<(), QueueError>;
}

/// Something that runs visit tasks taken off a queue
#[async_trait]
pub trait VisitHandler: Send + Sync + 'static {
    async fn handle(&self, task: VisitTask);
}

/// Counts tasks that were enqueued but have not finished
#[derive(Debug, Default)]
struct PendingTracker {
    count: AtomicUsize,
    idle: Notify,
}

impl PendingTracker {
    fn start(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Marks one task finished when dropped, even if the handler panicked
struct PendingGuard(Arc<PendingTracker>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// In-process work queue backed by an unbounded tokio channel
///
/// Tasks are started in FIFO order; at most `max_concurrent` run at once.
/// The queue accepts at most `max_tasks` tasks over its lifetime.
pub struct LocalWorkQueue {
    sender: Mutex<Option<mpsc::UnboundedSender<VisitTask>>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<VisitTask>>>,
    pending: Arc<PendingTracker>,
    accepted: AtomicU32,
    max_tasks: u32,
    max_concurrent: usize,
}

impl LocalWorkQueue {
    pub fn new(max_concurrent: usize, max_tasks: u32) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            pending: Arc::new(PendingTracker::default()),
            accepted: AtomicU32::new(0),
            max_tasks,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Starts the runner that feeds queued tasks to `handler`
    ///
    /// Returns `None` if a runner was already started. The runner exits once
    /// the queue is closed and every queued task has been started.
    pub fn spawn_runner(&self, handler: Arc<dyn VisitHandler>) -> Option<JoinHandle<()>> {
        let mut receiver = self.receiver.lock().ok()?.take()?;
        let pending = self.pending.clone();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));

        Some(tokio::spawn(async move {
            while let Some(task) = receiver.recv().await {
                let guard = PendingGuard(pending.clone());
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let handler = handler.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let _guard = guard;
                    handler.handle(task).await;
                });
            }
            tracing::debug!("Work queue runner stopped");
        }))
    }

    /// Waits until every enqueued task has finished
    ///
    /// Tasks enqueued by running tasks are waited for too.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.pending.idle.notified();
            if self.pending.count() == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Stops accepting tasks; already queued tasks still run
    pub fn close(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
    }

    /// Number of tasks enqueued but not yet finished
    pub fn pending(&self) -> usize {
        self.pending.count()
    }

    /// Number of tasks accepted so far
    pub fn accepted(&self) -> u32 {
        self.accepted.load(Ordering::SeqCst)
    }

    fn reserve_slot(&self) -> Result<(), QueueError> {
        self.accepted
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_tasks).then_some(n + 1)
            })
            .map(|_| ())
            .map_err(|_| QueueError::CapacityReached {
                limit: self.max_tasks,
            })
    }
}

#[async_trait]
impl WorkQueue for LocalWorkQueue {
    async fn enqueue(&self, target: CrawlTarget, lane: Lane) -> Result<(), QueueError> {
        let sender = self
            .sender
            .lock()
            .ok()
            .and_then(|s| s.as_ref().cloned())
            .ok_or(QueueError::Closed)?;

        self.reserve_slot()?;
        self.pending.start();

        tracing::trace!("Enqueue {} on lane {}", target.url, lane);
        if sender.send(VisitTask { target, lane }).is_err() {
            self.pending.finish();
            return Err(QueueError::Closed);
        }

        Ok(())
    }
}
