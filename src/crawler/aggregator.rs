//! Crawl result accumulation
//!
//! The aggregator is append-only while a crawl drains. Counts are computed once,
//! in [`Aggregator::finalize`].

use crate::crawler::record::{PageRecord, UniqueList};
use crate::state::{PageState, VisitedSet};
use std::collections::HashMap;

/// Per-outcome counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Number of frontier entries per outcome
    pub outcomes: HashMap<PageState, usize>,

    /// Links found across all recorded pages, duplicates included
    pub links_found: usize,

    /// Images found across all recorded pages, duplicates included
    pub images_found: usize,

    /// Whether the run was stopped before the frontier drained
    pub cancelled: bool,
}

impl CrawlStats {
    /// Count for one outcome
    pub fn count(&self, state: PageState) -> usize {
        self.outcomes.get(&state).copied().unwrap_or(0)
    }

    /// Total entries that reached a terminal outcome
    pub fn entries_processed(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Entries that ended in an error state
    pub fn errors(&self) -> usize {
        PageState::ALL
            .iter()
            .filter(|state| state.is_error())
            .map(|state| self.count(*state))
            .sum()
    }
}

/// The terminal artifact of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Recorded pages in processing order
    pub records: Vec<PageRecord>,

    /// Every image seen, de-duplicated in first-appearance order
    pub images: Vec<String>,

    /// Every link seen, de-duplicated in first-appearance order
    pub links: Vec<String>,

    /// Number of pages recorded
    pub pages_scraped: usize,

    /// Number of URLs in the visited set when the run ended
    pub visited_urls: usize,

    /// Outcome counters
    pub stats: CrawlStats,
}

/// Collects page records and aggregate link/image lists during a crawl
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Vec<PageRecord>,
    images: UniqueList,
    links: UniqueList,
    stats: CrawlStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and merges its images and links into the aggregate lists
    pub fn add_record(&mut self, record: PageRecord) {
        self.stats.links_found += record.links.len();
        self.stats.images_found += record.images.len();
        self.images.extend(record.images.iter().cloned());
        self.links.extend(record.links.iter().cloned());
        self.records.push(record);
    }

    /// Counts the outcome of one frontier entry
    pub fn record_outcome(&mut self, state: PageState) {
        *self.stats.outcomes.entry(state).or_insert(0) += 1;
    }

    /// Flags the run as cancelled
    pub fn mark_cancelled(&mut self) {
        self.stats.cancelled = true;
    }

    /// Number of records collected so far
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Builds the final result
    pub fn finalize(self, visited: &VisitedSet) -> CrawlResult {
        CrawlResult {
            pages_scraped: self.records.len(),
            visited_urls: visited.len(),
            records: self.records,
            images: self.images.into_vec(),
            links: self.links.into_vec(),
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, links: &[&str], images: &[&str]) -> PageRecord {
        let mut record = PageRecord::empty(url);
        record.links = links.iter().map(|s| s.to_string()).collect();
        record.images = images.iter().map(|s| s.to_string()).collect();
        record
    }

    #[test]
    fn test_finalize_merges_lists_in_order() {
        let mut aggregator = Aggregator::new();
        aggregator.add_record(record(
            "https://example.test/",
            &["https://example.test/a", "https://other.test/"],
            &["https://example.test/logo.png"],
        ));
        aggregator.add_record(record(
            "https://example.test/a",
            &["https://example.test/", "https://example.test/a", "https://example.test/b"],
            &["https://example.test/logo.png", "https://example.test/a.png"],
        ));

        let visited = VisitedSet::seeded(["https://example.test/", "https://example.test/a", "x"]);
        let result = aggregator.finalize(&visited);

        assert_eq!(result.pages_scraped, 2);
        assert_eq!(result.visited_urls, 3);
        assert_eq!(result.records[0].url, "https://example.test/");
        assert_eq!(
            result.links,
            vec![
                "https://example.test/a",
                "https://other.test/",
                "https://example.test/",
                "https://example.test/b",
            ]
        );
        assert_eq!(
            result.images,
            vec!["https://example.test/logo.png", "https://example.test/a.png"]
        );
        assert_eq!(result.stats.links_found, 5);
        assert_eq!(result.stats.images_found, 3);
    }

    #[test]
    fn test_outcome_counters() {
        let mut aggregator = Aggregator::new();
        aggregator.record_outcome(PageState::Processed);
        aggregator.record_outcome(PageState::Processed);
        aggregator.record_outcome(PageState::RobotsDenied);
        aggregator.record_outcome(PageState::FetchFailed);

        let result = aggregator.finalize(&VisitedSet::new());
        assert_eq!(result.stats.count(PageState::Processed), 2);
        assert_eq!(result.stats.count(PageState::OffDomain), 0);
        assert_eq!(result.stats.entries_processed(), 4);
        assert_eq!(result.stats.errors(), 1);
        assert!(!result.stats.cancelled);
    }
}
