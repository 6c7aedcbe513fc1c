//! State module for tracking crawl progress
//!
//! This module provides the run-scoped state owned by the frontier.
//!
//! # Components
//!
//! - `VisitedSet`: normalized URLs already fetched or skipped in this run
//! - `DomainState`: per-host pacing state
//! - `PageState`: the outcome of processing one frontier entry

mod domain_state;
mod page_state;
mod visited;

// Re-export main types
pub use domain_state::DomainState;
pub use page_state::PageState;
pub use visited::VisitedSet;
