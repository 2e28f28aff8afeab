//! Crawler coordinator - top-level crawl run
//!
//! This module wires the crawl components together and runs one crawl:
//! - Building the fetcher, visited set, blob store and work queue from config
//! - Resetting the visited set once for the run
//! - Visiting every seed, then draining the work queue
//! - Returning the run's statistics

use crate::config::Config;
use crate::crawler::dispatcher::Dispatcher;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::queue::{CrawlTarget, LocalWorkQueue, QueueError};
use crate::output::{CrawlStatistics, StatsSnapshot};
use crate::storage::{BlobStore, FsBlobStore};
use crate::url::parse_crawl_url;
use crate::visited::{open_visited_set, VisitedSet};
use crate::CrawlerError;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Main crawler structure
pub struct Crawler {
    seeds: Vec<Url>,
    visited: Arc<dyn VisitedSet>,
    queue: Arc<LocalWorkQueue>,
    dispatcher: Arc<Dispatcher>,
    stats: Arc<CrawlStatistics>,
}

impl Crawler {
    /// Creates a crawler from configuration
    ///
    /// Opens the configured visited-set backend, creates the download
    /// directory and builds the HTTP client.
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlerError)` - A component could not be built
    pub fn new(config: Config) -> Result<Self, CrawlerError> {
        let visited = open_visited_set(&config)?;
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.output.download_dir)?);
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config)?);

        Self::with_components(&config, fetcher, visited, store)
    }

    /// Creates a crawler around caller-provided components
    pub fn with_components(
        config: &Config,
        fetcher: Arc<dyn Fetcher>,
        visited: Arc<dyn VisitedSet>,
        store: Arc<dyn BlobStore>,
    ) -> Result<Self, CrawlerError> {
        let seeds = config
            .seeds
            .iter()
            .map(|s| parse_crawl_url(s))
            .collect::<Result<Vec<_>, _>>()?;

        let stats = Arc::new(CrawlStatistics::new());
        let queue = Arc::new(LocalWorkQueue::new(
            config.crawler.max_concurrent_visits as usize,
            config.crawler.max_pages,
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            fetcher,
            visited.clone(),
            store,
            queue.clone(),
            stats.clone(),
            config.crawler.max_depth,
        ));

        Ok(Self {
            seeds,
            visited,
            queue,
            dispatcher,
            stats,
        })
    }

    /// Seeds this crawler starts from, in order
    pub fn seeds(&self) -> &[Url] {
        &self.seeds
    }

    /// Live counters of this crawler
    pub fn stats(&self) -> Arc<CrawlStatistics> {
        self.stats.clone()
    }

    /// Runs the crawl to completion
    ///
    /// The visited set is reset once, not per seed, so a URL claimed while
    /// expanding one seed is not enqueued again from another. Seeds are
    /// visited in order on the calling task; everything they enqueue runs on
    /// the work queue. Returns once no visit is pending.
    pub async fn run(self) -> Result<StatsSnapshot, CrawlerError> {
        let start_time = Instant::now();

        self.visited.reset()?;
        let runner = self
            .queue
            .spawn_runner(self.dispatcher.clone())
            .ok_or(QueueError::Closed)?;

        for seed in &self.seeds {
            tracing::info!("Crawling seed {}", seed);
            let outcome = self.dispatcher.visit(&CrawlTarget::seed(seed.clone())).await;
            tracing::debug!("Seed {} finished as {}", seed, outcome.state);
        }

        self.queue.wait_idle().await;
        self.queue.close();
        if let Err(e) = runner.await {
            tracing::warn!("Work queue runner ended abnormally: {}", e);
        }

        let snapshot = self.stats.snapshot();
        tracing::info!(
            "Crawl completed in {:?}: {} pages visited, {} skipped, {} files saved",
            start_time.elapsed(),
            snapshot.pages_visited,
            snapshot.pages_skipped,
            snapshot.files_saved
        );

        Ok(snapshot)
    }
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use paap_crawler::config::load_config;
/// use paap_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("crawler.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} files saved", stats.files_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<StatsSnapshot, CrawlerError> {
    Crawler::new(config)?.run().await
}
