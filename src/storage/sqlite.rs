//! SQLite storage implementation
//!
//! This module provides a SQLite-backed [`RecordSink`] plus the read-back queries
//! used by the statistics output.

use crate::crawler::{CrawlResult, PageRecord};
use crate::state::PageState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::url::extract_domain;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use url::Url;

const RUN_COLUMNS: &str = "id, base_url, stored_at, config_hash, status, pages_scraped, \
                           visited_urls, unique_links, unique_images, outcomes";

const PAGE_COLUMNS: &str =
    "url, title, content, content_type, images, links, scraped_at, depth";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], read_run)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))?
    }

    /// Gets the most recent run
    pub fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, [], read_run)
            .optional()?
            .transpose()
    }

    /// Number of stored runs
    pub fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of distinct pages stored across all runs
    pub fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scraped_pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of distinct domains among stored pages
    pub fn count_unique_domains(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT domain) FROM scraped_pages",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Stored page count per crawl depth, shallowest first
    pub fn get_depth_breakdown(&self) -> StorageResult<Vec<(u32, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT depth, COUNT(*) FROM scraped_pages GROUP BY depth ORDER BY depth",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)? as u32, row.get::<_, i64>(1)? as u64))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Gets a stored page by URL
    pub fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let sql = format!("SELECT {} FROM scraped_pages WHERE url = ?1", PAGE_COLUMNS);
        self.conn
            .query_row(&sql, params![url], read_page)
            .optional()?
            .transpose()
    }

    /// Pages written by one run, in the order they were scraped
    pub fn get_pages_for_run(&self, run_id: i64) -> StorageResult<Vec<PageRecord>> {
        let sql = format!(
            "SELECT {} FROM scraped_pages WHERE run_id = ?1 ORDER BY id",
            PAGE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![run_id], read_page)?;

        let mut pages = Vec::new();
        for row in rows {
            pages.push(row??);
        }
        Ok(pages)
    }
}

impl RecordSink for SqliteStorage {
    fn store_run(
        &mut self,
        base_url: &str,
        config_hash: &str,
        status: RunStatus,
        result: &CrawlResult,
    ) -> StorageResult<i64> {
        let outcomes: Vec<(&str, usize)> = PageState::ALL
            .iter()
            .map(|state| (state.as_str(), result.stats.count(*state)))
            .collect();
        let outcomes = serde_json::to_string(&outcomes)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO runs (base_url, stored_at, config_hash, status, pages_scraped, \
             visited_urls, unique_links, unique_images, outcomes) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                base_url,
                Utc::now().to_rfc3339(),
                config_hash,
                status.to_db_string(),
                result.pages_scraped as i64,
                result.visited_urls as i64,
                result.links.len() as i64,
                result.images.len() as i64,
                outcomes,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO scraped_pages (url, domain, title, content, content_type, images, \
                 links, scraped_at, depth, run_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
                 ON CONFLICT(url) DO UPDATE SET \
                    domain = excluded.domain, \
                    title = excluded.title, \
                    content = excluded.content, \
                    content_type = excluded.content_type, \
                    images = excluded.images, \
                    links = excluded.links, \
                    scraped_at = excluded.scraped_at, \
                    depth = excluded.depth, \
                    run_id = excluded.run_id",
            )?;

            for record in &result.records {
                let domain = Url::parse(&record.url)
                    .ok()
                    .and_then(|url| extract_domain(&url))
                    .unwrap_or_default();

                stmt.execute(params![
                    record.url,
                    domain,
                    record.title,
                    record.content,
                    record.content_type,
                    serde_json::to_string(&record.images)?,
                    serde_json::to_string(&record.links)?,
                    record.scraped_at.to_rfc3339(),
                    record.depth,
                    run_id,
                ])?;
            }
        }

        tx.commit()?;
        tracing::info!(
            "Stored run {} with {} pages",
            run_id,
            result.records.len()
        );
        Ok(run_id)
    }
}

fn read_run(row: &Row<'_>) -> rusqlite::Result<StorageResult<RunRecord>> {
    let status: String = row.get(4)?;
    let outcomes: String = row.get(9)?;

    let record = || -> StorageResult<RunRecord> {
        Ok(RunRecord {
            id: row.get(0)?,
            base_url: row.get(1)?,
            stored_at: row.get(2)?,
            config_hash: row.get(3)?,
            status: RunStatus::from_db_string(&status).ok_or_else(|| {
                StorageError::Serialization(format!("Unknown run status: {}", status))
            })?,
            pages_scraped: row.get::<_, i64>(5)? as u64,
            visited_urls: row.get::<_, i64>(6)? as u64,
            unique_links: row.get::<_, i64>(7)? as u64,
            unique_images: row.get::<_, i64>(8)? as u64,
            outcomes: serde_json::from_str(&outcomes)?,
        })
    };
    Ok(record())
}

fn read_page(row: &Row<'_>) -> rusqlite::Result<StorageResult<PageRecord>> {
    let images: String = row.get(4)?;
    let links: String = row.get(5)?;
    let scraped_at: String = row.get(6)?;

    let record = || -> StorageResult<PageRecord> {
        Ok(PageRecord {
            url: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            content_type: row.get(3)?,
            images: serde_json::from_str(&images)?,
            links: serde_json::from_str(&links)?,
            scraped_at: DateTime::parse_from_rfc3339(&scraped_at)
                .map_err(|e| StorageError::Serialization(e.to_string()))?
                .with_timezone(&Utc),
            depth: row.get(7)?,
        })
    };
    Ok(record())
}
