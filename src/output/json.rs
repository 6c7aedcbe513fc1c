//! JSON export of crawl records
//!
//! Records are written as an array of `{url, title, content, content_type, images,
//! links, scraped_at}` objects, the shape downstream consumers read.

use crate::crawler::PageRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializes records to a pretty-printed JSON string
pub fn records_to_json(records: &[PageRecord]) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Writes records as JSON to `path`, replacing any existing file
pub fn write_records_json(records: &[PageRecord], path: &Path) -> crate::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Reads records previously written by [`write_records_json`]
pub fn read_records_json(path: &Path) -> crate::Result<Vec<PageRecord>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
