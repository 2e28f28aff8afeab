/// Visit state definitions for one crawl task
///
/// A task moves `Fetching → Classifying → {Persisting | Enqueuing} → Done`,
/// or ends in `Skipped` when the page itself cannot be fetched.
use std::fmt;

/// Represents the current state of a single visit task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitState {
    // ===== Active States =====
    /// The page is being downloaded
    Fetching,

    /// The page body is being scanned for file and navigation links
    Classifying,

    /// File links were found and are being downloaded and saved
    Persisting,

    /// Navigation links are being claimed and enqueued
    Enqueuing,

    // ===== Terminal States =====
    /// The task ran to completion (possibly with per-file or per-link failures)
    Done,

    /// The page could not be fetched; nothing else happened
    Skipped,
}

impl VisitState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Skipped)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: VisitState) -> bool {
        use VisitState::*;

        matches!(
            (self, next),
            (Fetching, Classifying)
                | (Fetching, Skipped)
                | (Classifying, Persisting)
                | (Classifying, Enqueuing)
                | (Classifying, Done)
                | (Persisting, Done)
                | (Enqueuing, Done)
        )
    }

    /// Short lowercase label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Classifying => "classifying",
            Self::Persisting => "persisting",
            Self::Enqueuing => "enqueuing",
            Self::Done => "done",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
