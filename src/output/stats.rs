//! Crawl statistics
//!
//! Counters are shared by every visit task of a run and updated without
//! locking. A [`StatsSnapshot`] freezes them for reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Something worth counting during a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlEvent {
    /// A page was fetched and classified
    PageVisited,
    /// A page could not be fetched
    PageSkipped,
    /// A file link was found
    FileFound,
    /// A file was downloaded and persisted
    FileSaved,
    /// A file could not be downloaded, named or persisted
    FileFailed,
    /// A navigation link was claimed and enqueued
    LinkEnqueued,
    /// A navigation link was already in the visited set
    LinkAlreadyVisited,
    /// A navigation link pointed to another host
    LinkCrossDomain,
    /// A navigation link was beyond the depth ceiling
    LinkTooDeep,
    /// A navigation link could not be claimed or enqueued
    EnqueueFailed,
}

/// Live counters for one crawl run
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    pages_visited: AtomicU64,
    pages_skipped: AtomicU64,
    files_found: AtomicU64,
    files_saved: AtomicU64,
    files_failed: AtomicU64,
    links_enqueued: AtomicU64,
    links_already_visited: AtomicU64,
    links_cross_domain: AtomicU64,
    links_too_deep: AtomicU64,
    enqueue_failures: AtomicU64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `event`
    pub fn record(&self, event: CrawlEvent) {
        self.counter(event).fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of the counter behind `event`
    pub fn get(&self, event: CrawlEvent) -> u64 {
        self.counter(event).load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        use CrawlEvent::*;

        StatsSnapshot {
            pages_visited: self.get(PageVisited),
            pages_skipped: self.get(PageSkipped),
            files_found: self.get(FileFound),
            files_saved: self.get(FileSaved),
            files_failed: self.get(FileFailed),
            links_enqueued: self.get(LinkEnqueued),
            links_already_visited: self.get(LinkAlreadyVisited),
            links_cross_domain: self.get(LinkCrossDomain),
            links_too_deep: self.get(LinkTooDeep),
            enqueue_failures: self.get(EnqueueFailed),
        }
    }

    fn counter(&self, event: CrawlEvent) -> &AtomicU64 {
        match event {
            CrawlEvent::PageVisited => &self.pages_visited,
            CrawlEvent::PageSkipped => &self.pages_skipped,
            CrawlEvent::FileFound => &self.files_found,
            CrawlEvent::FileSaved => &self.files_saved,
            CrawlEvent::FileFailed => &self.files_failed,
            CrawlEvent::LinkEnqueued => &self.links_enqueued,
            CrawlEvent::LinkAlreadyVisited => &self.links_already_visited,
            CrawlEvent::LinkCrossDomain => &self.links_cross_domain,
            CrawlEvent::LinkTooDeep => &self.links_too_deep,
            CrawlEvent::EnqueueFailed => &self.enqueue_failures,
        }
    }
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_visited: u64,
    pub pages_skipped: u64,
    pub files_found: u64,
    pub files_saved: u64,
    pub files_failed: u64,
    pub links_enqueued: u64,
    pub links_already_visited: u64,
    pub links_cross_domain: u64,
    pub links_too_deep: u64,
    pub enqueue_failures: u64,
}

impl StatsSnapshot {
    /// Pages attempted, fetched or not
    pub fn pages_attempted(&self) -> u64 {
        self.pages_visited + self.pages_skipped
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StatsSnapshot) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Skipped (fetch failed): {}", stats.pages_skipped);
    println!();

    println!("Files:");
    println!("  Found: {}", stats.files_found);
    println!("  Saved: {}", stats.files_saved);
    println!("  Failed: {}", stats.files_failed);
    println!();

    println!("Navigation links:");
    println!("  Enqueued: {}", stats.links_enqueued);
    println!("  Already visited: {}", stats.links_already_visited);
    println!("  Cross-domain (dropped): {}", stats.links_cross_domain);
    println!("  Beyond max depth (dropped): {}", stats.links_too_deep);
    if stats.enqueue_failures > 0 {
        println!("  Enqueue failures: {}", stats.enqueue_failures);
    }
    println!();

    let attempted = stats.pages_attempted();
    let success_rate = if attempted > 0 {
        (stats.pages_visited as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        success_rate, stats.pages_visited, attempted
    );
}
