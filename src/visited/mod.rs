//! Visited-set cache shared by all visit tasks of a crawl run
//!
//! A URL is enqueued for crawling at most once while its entry is live. All
//! access goes through [`VisitedSet::claim`], a single check-and-set step, so
//! two workers racing on the same link cannot both win.
//!
//! Two backends are provided:
//! - [`MemoryVisitedSet`]: a mutex-guarded map, for single-process crawls
//! - [`SqliteVisitedSet`]: a SQLite table, for crawls spread over processes

mod memory;
mod sqlite;

pub use memory::MemoryVisitedSet;
pub use sqlite::SqliteVisitedSet;

use crate::config::{Config, VisitedBackend};
use chrono::Duration;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Default time a claimed URL stays in the set
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

/// Errors that can occur during visited-set operations
#[derive(Debug, Error)]
pub enum VisitedError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Visited set lock poisoned")]
    Poisoned,
}

/// Result type for visited-set operations
pub type VisitedResult<T> = Result<T, VisitedError>;

/// Time-bounded set of URLs already enqueued during a crawl session
pub trait VisitedSet: Send + Sync {
    /// Records `key` and returns true iff it was absent or its entry expired
    fn claim(&self, key: &str) -> VisitedResult<bool>;

    /// Forgets every entry; called once before a fresh crawl run
    fn reset(&self) -> VisitedResult<()>;

    /// Number of live entries
    fn len(&self) -> VisitedResult<usize>;

    /// Returns true if no live entries exist
    fn is_empty(&self) -> VisitedResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Builds the visited-set backend named in the configuration
pub fn open_visited_set(config: &Config) -> VisitedResult<Arc<dyn VisitedSet>> {
    let retention = Duration::hours(i64::from(config.crawler.visited_retention_hours));

    match config.visited.backend {
        VisitedBackend::Memory => Ok(Arc::new(MemoryVisitedSet::new(retention))),
        VisitedBackend::Sqlite => {
            // Validation guarantees the path is present for this backend
            let path = config.visited.database_path.as_deref().unwrap_or("visited.db");
            Ok(Arc::new(SqliteVisitedSet::open(Path::new(path), retention)?))
        }
    }
}
