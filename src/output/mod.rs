//! Output module for crawl results
//!
//! This module handles:
//! - Exporting records as JSON in their wire shape
//! - Printing run summaries and stored statistics

mod json;
pub mod stats;

pub use json::{read_records_json, records_to_json, write_records_json};
pub use stats::{load_statistics, print_statistics, print_summary, success_rate, CrawlStatistics};
