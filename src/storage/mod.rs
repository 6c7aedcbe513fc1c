//! Storage module for persisting crawl results
//!
//! This module handles the hand-off of finished crawls, including:
//! - SQLite database initialization and schema management
//! - Run bookkeeping with the configuration fingerprint
//! - Page records stored in their wire shape
//! - Read-back queries used for statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{RecordSink, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a stored crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub base_url: String,
    pub stored_at: String,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_scraped: u64,
    pub visited_urls: u64,
    pub unique_links: u64,
    pub unique_images: u64,
    /// Entry outcome name to count, in reporting order
    pub outcomes: Vec<(String, u64)>,
}

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The frontier drained or hit the page limit
    Completed,
    /// The run was stopped early
    Interrupted,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            _ => None,
        }
    }
}
