//! Crawl dispatcher: one `visit` step
//!
//! A visit fetches one page, classifies its links and then either downloads
//! the file links or enqueues the in-domain navigation links as new visits.
//! Nothing raised inside a visit escapes it: failures are logged, counted and
//! turned into a no-op for that page, file or link.

use crate::crawler::classifier::{classify, LinkCandidate};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::queue::{CrawlTarget, Lane, VisitHandler, VisitTask, WorkQueue};
use crate::output::{CrawlEvent, CrawlStatistics};
use crate::state::VisitState;
use crate::storage::BlobStore;
use crate::url::{same_host, visited_key};
use crate::visited::VisitedSet;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// What a single visit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitOutcome {
    pub url: Url,

    /// Terminal state: `Done` or `Skipped`
    pub state: VisitState,

    pub files_saved: usize,
    pub files_failed: usize,
    pub links_enqueued: usize,
}

impl VisitOutcome {
    fn new(url: &Url) -> Self {
        Self {
            url: url.clone(),
            state: VisitState::Fetching,
            files_saved: 0,
            files_failed: 0,
            links_enqueued: 0,
        }
    }

    fn advance(&mut self, next: VisitState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal visit transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
    }
}

/// Runs visits against injected collaborators
pub struct Dispatcher {
    fetcher: Arc<dyn Fetcher>,
    visited: Arc<dyn VisitedSet>,
    store: Arc<dyn BlobStore>,
    queue: Arc<dyn WorkQueue>,
    stats: Arc<CrawlStatistics>,
    max_depth: u32,
}

impl Dispatcher {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        visited: Arc<dyn VisitedSet>,
        store: Arc<dyn BlobStore>,
        queue: Arc<dyn WorkQueue>,
        stats: Arc<CrawlStatistics>,
        max_depth: u32,
    ) -> Self {
        Self {
            fetcher,
            visited,
            store,
            queue,
            stats,
            max_depth,
        }
    }

    /// Visits one target and runs it to `Done` or `Skipped`
    ///
    /// # Flow
    ///
    /// 1. Fetch the page; on failure the visit ends `Skipped`
    /// 2. Classify its anchors
    /// 3. File links found: download and persist each one independently
    /// 4. Otherwise: claim and enqueue each same-host navigation link that is
    ///    within the depth ceiling
    pub async fn visit(&self, target: &CrawlTarget) -> VisitOutcome {
        let mut outcome = VisitOutcome::new(&target.url);

        let document = match self.fetcher.fetch(&target.url).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", target.url, e);
                self.stats.record(CrawlEvent::PageSkipped);
                outcome.advance(VisitState::Skipped);
                return outcome;
            }
        };

        tracing::info!("Crawled {} (depth {})", target.url, target.depth);
        self.stats.record(CrawlEvent::PageVisited);
        outcome.advance(VisitState::Classifying);

        // Links resolve against the requested URL, not a redirect target
        let links = classify(&document.text(), &target.url);

        if links.is_empty() {
            tracing::debug!("No procurement links on {}", target.url);
        } else if !links.file_links.is_empty() {
            outcome.advance(VisitState::Persisting);
            self.persist_files(&links.file_links, &mut outcome).await;
        } else {
            outcome.advance(VisitState::Enqueuing);
            self.enqueue_links(target, &links.nav_links, &mut outcome)
                .await;
        }

        outcome.advance(VisitState::Done);
        outcome
    }

    async fn persist_files(&self, links: &[LinkCandidate], outcome: &mut VisitOutcome) {
        for link in links {
            self.stats.record(CrawlEvent::FileFound);

            if self.persist_file(link).await {
                self.stats.record(CrawlEvent::FileSaved);
                outcome.files_saved += 1;
            } else {
                self.stats.record(CrawlEvent::FileFailed);
                outcome.files_failed += 1;
            }
        }
    }

    async fn persist_file(&self, link: &LinkCandidate) -> bool {
        let file = match self.fetcher.fetch(&link.uri).await {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Skipping file {}: {}", link.uri, e);
                return false;
            }
        };

        let Some(name) = sanitize_file_name(&link.uri) else {
            tracing::warn!("No usable file name in {}", link.uri);
            return false;
        };

        let size = file.body.len();
        match self.store.save(&name, file.body).await {
            Ok(()) => {
                tracing::info!("Saved {} ({} bytes) from {}", name, size, link.uri);
                true
            }
            Err(e) => {
                tracing::warn!("Could not save {} from {}: {}", name, link.uri, e);
                false
            }
        }
    }

    async fn enqueue_links(
        &self,
        target: &CrawlTarget,
        links: &[LinkCandidate],
        outcome: &mut VisitOutcome,
    ) {
        for link in links {
            if !same_host(&link.uri, &target.url) {
                tracing::debug!("Dropping cross-domain link {} on {}", link.uri, target.url);
                self.stats.record(CrawlEvent::LinkCrossDomain);
                continue;
            }

            let child = target.child(link.uri.clone());
            if child.depth > self.max_depth {
                tracing::debug!(
                    "Dropping {}: depth {} exceeds {}",
                    link.uri,
                    child.depth,
                    self.max_depth
                );
                self.stats.record(CrawlEvent::LinkTooDeep);
                continue;
            }

            match self.visited.claim(&visited_key(&link.uri)) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!("Already visited {}", link.uri);
                    self.stats.record(CrawlEvent::LinkAlreadyVisited);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Could not claim {}: {}", link.uri, e);
                    self.stats.record(CrawlEvent::EnqueueFailed);
                    continue;
                }
            }

            // The claim stands even if the queue refuses the task
            match self.queue.enqueue(child, Lane::WebCrawler).await {
                Ok(()) => {
                    tracing::debug!("Enqueued {}", link.uri);
                    self.stats.record(CrawlEvent::LinkEnqueued);
                    outcome.links_enqueued += 1;
                }
                Err(e) => {
                    tracing::warn!("Claimed {} but could not enqueue it: {}", link.uri, e);
                    self.stats.record(CrawlEvent::EnqueueFailed);
                }
            }
        }
    }
}

#[async_trait]
impl VisitHandler for Dispatcher {
    async fn handle(&self, task: VisitTask) {
        tracing::trace!("Visiting {} from lane {}", task.target.url, task.lane);
        self.visit(&task.target).await;
    }
}

/// Derives the stored file name for a downloaded file
///
/// Every `%` in the URL is replaced with `-`, then the last path segment is
/// taken. Returns `None` when nothing usable remains.
///
/// # Examples
///
/// ```
/// use paap_crawler::crawler::sanitize_file_name;
/// use url::Url;
///
/// let url = Url::parse("https://mfe.gov.ro/docs/raport%202023.xlsx").unwrap();
/// assert_eq!(sanitize_file_name(&url).as_deref(), Some("raport-202023.xlsx"));
/// ```
pub fn sanitize_file_name(url: &Url) -> Option<String> {
    let mut url = url.clone();
    url.set_fragment(None);

    let replaced = url.as_str().replace('%', "-");
    let name = replaced
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .replace('\\', "-");

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}
