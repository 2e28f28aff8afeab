//! Output module for crawl reporting
//!
//! Counters collected while crawling and their printed summary.

pub mod stats;

pub use stats::{print_statistics, CrawlEvent, CrawlStatistics, StatsSnapshot};
