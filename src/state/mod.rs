//! State module for tracking crawl progress
//!
//! `VisitState` tracks where a single visit task is in its lifecycle. No state
//! is retried: each task runs once to `Done` or `Skipped`.

mod visit_state;

pub use visit_state::VisitState;
