//! Crawler module for procurement document discovery
//!
//! This module contains the core crawling logic, including:
//! - The fixed keyword lists and the link classifier
//! - HTTP fetching with typed failures
//! - The work queue that replaces recursive self-dispatch
//! - The `visit` dispatcher and the top-level crawl run

mod classifier;
mod coordinator;
mod dispatcher;
mod fetcher;
mod keywords;
mod queue;

pub use classifier::{classify, try_classify, Classification, ClassificationError, LinkCandidate};
pub use coordinator::{run_crawl, Crawler};
pub use dispatcher::{sanitize_file_name, Dispatcher, VisitOutcome};
pub use fetcher::{build_http_client, Document, FetchError, Fetcher, HttpFetcher};
pub use keywords::{
    href_contains_extension, href_contains_url_keyword, text_matches_keyword, FILE_EXTENSIONS,
    TEXT_KEYWORDS, URL_KEYWORDS,
};
pub use queue::{
    CrawlTarget, Lane, LocalWorkQueue, QueueError, VisitHandler, VisitTask, WorkQueue,
};
