//! In-memory visited set
//!
//! Entries carry the time of their claim and expire after the retention
//! window (24 hours unless configured otherwise).

use super::{VisitedError, VisitedResult, VisitedSet};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local visited set backed by a mutex-guarded map
#[derive(Debug)]
pub struct MemoryVisitedSet {
    /// URL key -> time of claim
    entries: Mutex<HashMap<String, DateTime<Utc>>>,

    /// How long an entry blocks re-claiming
    retention: Duration,
}

impl MemoryVisitedSet {
    /// Creates an empty set with the given retention window
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retention,
        }
    }

    /// Claims `key` as if the current time were `now`
    ///
    /// The lookup, expiry check and insert happen under one lock.
    pub fn claim_at(&self, key: &str, now: DateTime<Utc>) -> VisitedResult<bool> {
        let mut entries = self.entries.lock().map_err(|_| VisitedError::Poisoned)?;

        match entries.get(key) {
            Some(claimed_at) if now - *claimed_at < self.retention => Ok(false),
            _ => {
                entries.insert(key.to_string(), now);
                Ok(true)
            }
        }
    }
}

impl Default for MemoryVisitedSet {
    fn default() -> Self {
        Self::new(Duration::hours(super::DEFAULT_RETENTION_HOURS))
    }
}

impl VisitedSet for MemoryVisitedSet {
    fn claim(&self, key: &str) -> VisitedResult<bool> {
        self.claim_at(key, Utc::now())
    }

    fn reset(&self) -> VisitedResult<()> {
        let mut entries = self.entries.lock().map_err(|_| VisitedError::Poisoned)?;
        entries.clear();
        Ok(())
    }

    fn len(&self) -> VisitedResult<usize> {
        let now = Utc::now();
        let entries = self.entries.lock().map_err(|_| VisitedError::Poisoned)?;
        Ok(entries
            .values()
            .filter(|claimed_at| now - **claimed_at < self.retention)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const URL: &str = "https://mfe.gov.ro/achizitii/pagina2";

    #[test]
    fn test_claim_twice() {
        let visited = MemoryVisitedSet::default();

        assert!(visited.claim(URL).unwrap());
        assert!(!visited.claim(URL).unwrap());
    }

    #[test]
    fn test_distinct_urls_are_independent() {
        let visited = MemoryVisitedSet::default();

        assert!(visited.claim(URL).unwrap());
        assert!(visited.claim("https://mfe.gov.ro/achizitii/pagina3").unwrap());
        assert_eq!(visited.len().unwrap(), 2);
    }

    #[test]
    fn test_claim_after_expiry() {
        let visited = MemoryVisitedSet::default();
        let start = Utc::now();

        assert!(visited.claim_at(URL, start).unwrap());
        assert!(!visited.claim_at(URL, start + Duration::hours(23)).unwrap());
        assert!(visited.claim_at(URL, start + Duration::hours(25)).unwrap());

        // The re-claim starts a fresh window
        assert!(!visited.claim_at(URL, start + Duration::hours(26)).unwrap());
    }

    #[test]
    fn test_expiry_at_exact_window_boundary() {
        let visited = MemoryVisitedSet::new(Duration::hours(24));
        let start = Utc::now();

        assert!(visited.claim_at(URL, start).unwrap());
        assert!(visited.claim_at(URL, start + Duration::hours(24)).unwrap());
    }

    #[test]
    fn test_reset_clears_everything() {
        let visited = MemoryVisitedSet::default();
        visited.claim(URL).unwrap();

        visited.reset().unwrap();

        assert!(visited.is_empty().unwrap());
        assert!(visited.claim(URL).unwrap());
    }

    #[test]
    fn test_len_counts_live_entries_only() {
        let visited = MemoryVisitedSet::default();
        let start = Utc::now() - Duration::hours(30);

        visited.claim_at("https://ina.gov.ro/old", start).unwrap();
        visited.claim(URL).unwrap();

        assert_eq!(visited.len().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let visited = Arc::new(MemoryVisitedSet::default());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = Arc::clone(&visited);
                std::thread::spawn(move || visited.claim(URL).unwrap())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
    }
}
