//! Storage traits and error types
//!
//! The crawler hands a finished [`CrawlResult`] to a [`RecordSink`]; it does not
//! know what kind of store sits behind it.

use crate::crawler::CrawlResult;
use crate::storage::RunStatus;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Receives the batch of records produced by one crawl run
pub trait RecordSink {
    /// Persists every record of `result` as part of a new run
    ///
    /// # Arguments
    ///
    /// * `base_url` - The crawl's base URL
    /// * `config_hash` - Fingerprint of the configuration the run used
    /// * `status` - How the run ended
    /// * `result` - The finished crawl result
    ///
    /// # Returns
    ///
    /// The ID of the stored run
    fn store_run(
        &mut self,
        base_url: &str,
        config_hash: &str,
        status: RunStatus,
        result: &CrawlResult,
    ) -> StorageResult<i64>;
}
