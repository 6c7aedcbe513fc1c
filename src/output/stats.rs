//! Crawl statistics
//!
//! Summaries come from two places: the in-memory [`CrawlResult`] right after a run,
//! and the database for the `--stats` mode.

use crate::crawler::CrawlResult;
use crate::state::PageState;
use crate::storage::{RunRecord, SqliteStorage, StorageResult};

/// Statistics loaded from the database
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Number of stored runs
    pub total_runs: u64,

    /// Number of distinct stored pages
    pub total_pages: u64,

    /// Number of distinct domains among stored pages
    pub unique_domains: u64,

    /// Stored page count per crawl depth
    pub pages_by_depth: Vec<(u32, u64)>,

    /// The most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
pub fn load_statistics(storage: &SqliteStorage) -> StorageResult<CrawlStatistics> {
    Ok(CrawlStatistics {
        total_runs: storage.count_runs()?,
        total_pages: storage.count_pages()?,
        unique_domains: storage.count_unique_domains()?,
        pages_by_depth: storage.get_depth_breakdown()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints database statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Stored runs: {}", stats.total_runs);
    println!("  Stored pages: {}", stats.total_pages);
    println!("  Unique domains: {}", stats.unique_domains);
    println!();

    if !stats.pages_by_depth.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in &stats.pages_by_depth {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run (#{}):", run.id);
            println!("  Base URL: {}", run.base_url);
            println!("  Stored at: {}", run.stored_at);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Pages scraped: {}", run.pages_scraped);
            println!("  URLs visited: {}", run.visited_urls);
            println!("  Unique links: {}", run.unique_links);
            println!("  Unique images: {}", run.unique_images);
            for (outcome, count) in run.outcomes.iter().filter(|(_, count)| *count > 0) {
                println!("  {}: {}", outcome, count);
            }
        }
        None => println!("No crawl runs found in database"),
    }
}

/// Share of handled entries that produced a record, as a percentage
pub fn success_rate(result: &CrawlResult) -> f64 {
    let handled = result.stats.entries_processed();
    if handled == 0 {
        return 0.0;
    }
    result.stats.count(PageState::Processed) as f64 / handled as f64 * 100.0
}

/// Prints the summary of a finished run to stdout
pub fn print_summary(result: &CrawlResult) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Pages scraped: {}", result.pages_scraped);
    println!("  URLs visited: {}", result.visited_urls);
    println!(
        "  Links found: {} ({} unique)",
        result.stats.links_found,
        result.links.len()
    );
    println!(
        "  Images found: {} ({} unique)",
        result.stats.images_found,
        result.images.len()
    );
    if result.stats.cancelled {
        println!("  Stopped early: yes");
    }
    println!();

    println!("Entries by Outcome:");
    for state in PageState::ALL {
        let count = result.stats.count(state);
        if count > 0 {
            println!("  {}: {}", state, count);
        }
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} entries recorded)",
        success_rate(result),
        result.stats.count(PageState::Processed),
        result.stats.entries_processed()
    );
}
