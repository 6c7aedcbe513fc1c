//! Database schema definitions
//!
//! One row per persisted crawl run, one row per scraped page. Pages are keyed by
//! URL so a later run refreshes the stored copy instead of duplicating it.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    base_url TEXT NOT NULL,
    stored_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_scraped INTEGER NOT NULL DEFAULT 0,
    visited_urls INTEGER NOT NULL DEFAULT 0,
    unique_links INTEGER NOT NULL DEFAULT 0,
    unique_images INTEGER NOT NULL DEFAULT 0,
    outcomes TEXT NOT NULL DEFAULT '{}'
);

-- Scraped page records in the wire shape
CREATE TABLE IF NOT EXISTS scraped_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    domain TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    content_type TEXT NOT NULL,
    images TEXT NOT NULL,
    links TEXT NOT NULL,
    scraped_at TEXT NOT NULL,
    depth INTEGER NOT NULL,
    run_id INTEGER NOT NULL REFERENCES runs(id)
);

CREATE INDEX IF NOT EXISTS idx_scraped_pages_domain ON scraped_pages(domain);
CREATE INDEX IF NOT EXISTS idx_scraped_pages_run ON scraped_pages(run_id);
"#;

/// Initializes the database schema
///
/// Safe to call on an existing database.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
