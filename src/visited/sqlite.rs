//! SQLite visited set
//!
//! Several crawler processes can point at the same database file. A claim is
//! one upsert statement, so SQLite's write lock makes it atomic across
//! connections.

use super::{VisitedError, VisitedResult, VisitedSet};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQL schema for the visited set
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS visited_urls (
    url TEXT PRIMARY KEY NOT NULL,
    claimed_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_visited_claimed_at ON visited_urls(claimed_at);
"#;

/// Inserts a fresh claim, or refreshes an expired one. Zero rows change when
/// a live entry already exists.
const CLAIM_SQL: &str = "
    INSERT INTO visited_urls (url, claimed_at) VALUES (?1, ?2)
    ON CONFLICT(url) DO UPDATE SET claimed_at = excluded.claimed_at
    WHERE visited_urls.claimed_at <= ?3
";

/// Visited set persisted in a SQLite table with a retention window
pub struct SqliteVisitedSet {
    conn: Mutex<Connection>,
    retention: Duration,
}

impl SqliteVisitedSet {
    /// Opens (or creates) the visited-set database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `retention` - How long a claim blocks re-claiming the same URL
    pub fn open(path: &Path, retention: Duration) -> VisitedResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        Self::with_connection(conn, retention)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(retention: Duration) -> VisitedResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, retention)
    }

    fn with_connection(conn: Connection, retention: Duration) -> VisitedResult<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            retention,
        })
    }

    /// Claims `key` as if the current time were `now`
    pub fn claim_at(&self, key: &str, now: DateTime<Utc>) -> VisitedResult<bool> {
        let cutoff = (now - self.retention).timestamp_millis();
        let conn = self.conn.lock().map_err(|_| VisitedError::Poisoned)?;
        let changed = conn.execute(CLAIM_SQL, params![key, now.timestamp_millis(), cutoff])?;
        Ok(changed == 1)
    }
}

impl VisitedSet for SqliteVisitedSet {
    fn claim(&self, key: &str) -> VisitedResult<bool> {
        self.claim_at(key, Utc::now())
    }

    fn reset(&self) -> VisitedResult<()> {
        let conn = self.conn.lock().map_err(|_| VisitedError::Poisoned)?;
        conn.execute("DELETE FROM visited_urls", [])?;
        Ok(())
    }

    fn len(&self) -> VisitedResult<usize> {
        let cutoff = (Utc::now() - self.retention).timestamp_millis();
        let conn = self.conn.lock().map_err(|_| VisitedError::Poisoned)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM visited_urls WHERE claimed_at > ?1",
            params![cutoff],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
