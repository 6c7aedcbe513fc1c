use std::collections::HashSet;

/// Set of normalized URLs already fetched or skipped in the current run
///
/// Membership test and insertion happen in a single call so a URL can be
/// claimed at most once.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a visited set pre-seeded with URLs the caller already handled
    pub fn seeded<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Marks a URL visited
    ///
    /// Returns `true` if the URL was not visited before, `false` if it already was.
    pub fn mark(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    /// Returns whether a URL has been visited
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Number of visited URLs
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Returns whether nothing has been visited yet
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
