//! Page record type handed to the persistence collaborator
//!
//! The serialized shape `{url, title, content, content_type, images, links, scraped_at}`
//! is what downstream storage already depends on; keep it stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Content-type tag carried by every fetched page
pub const CONTENT_TYPE_HTML: &str = "html";

/// The result of successfully processing one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Source URL (final URL after redirects)
    pub url: String,

    /// Text of the first `<title>` element, or empty
    pub title: String,

    /// Visible text, whitespace-collapsed
    pub content: String,

    /// Always [`CONTENT_TYPE_HTML`] for fetched pages
    pub content_type: String,

    /// Absolute image URLs, first-appearance order, no duplicates
    pub images: Vec<String>,

    /// Absolute outbound link URLs, first-appearance order, no duplicates
    pub links: Vec<String>,

    /// When the page was captured, serialized as ISO-8601
    pub scraped_at: DateTime<Utc>,

    /// BFS distance from the nearest seed; not part of the wire format
    #[serde(skip)]
    pub depth: u32,
}

impl PageRecord {
    /// Creates a record with no extracted content, captured now
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content: String::new(),
            content_type: CONTENT_TYPE_HTML.to_string(),
            images: Vec::new(),
            links: Vec::new(),
            scraped_at: Utc::now(),
            depth: 0,
        }
    }
}

/// Order-preserving list that ignores repeated entries
#[derive(Debug, Clone, Default)]
pub struct UniqueList {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl UniqueList {
    /// Creates an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` unless it is empty or already present; returns whether it was added
    pub fn push(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if item.is_empty() || self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    /// Appends every item in order
    pub fn extend<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in items {
            self.push(item);
        }
    }

    /// Returns whether `item` is present
    pub fn contains(&self, item: &str) -> bool {
        self.seen.contains(item)
    }

    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrows the items in insertion order
    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    /// Consumes the list, returning the items in insertion order
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}
