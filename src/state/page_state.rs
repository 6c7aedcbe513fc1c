/// Outcome definitions for frontier entries
///
/// Every entry popped from the frontier ends in exactly one of these states.
use std::fmt;

/// What happened to a frontier entry once it was processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Terminal Success States =====
    /// Page was fetched, extracted and recorded
    Processed,

    // ===== Terminal Skip States =====
    /// URL was already in the visited set
    AlreadyVisited,

    /// URL is outside the crawl's network location
    OffDomain,

    /// robots.txt disallows the URL for our agent
    RobotsDenied,

    /// Redirect landed on a URL that was already visited or is off-domain
    RedirectDuplicate,

    // ===== Terminal Error States =====
    /// Fetch failed (timeout, connection error, non-2xx, non-HTML body)
    FetchFailed,
}

impl PageState {
    /// All states, in reporting order
    pub const ALL: [PageState; 6] = [
        Self::Processed,
        Self::AlreadyVisited,
        Self::OffDomain,
        Self::RobotsDenied,
        Self::RedirectDuplicate,
        Self::FetchFailed,
    ];

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if the entry was discarded without a fetch attempt
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::AlreadyVisited | Self::OffDomain | Self::RobotsDenied
        )
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::FetchFailed)
    }

    /// Stable lowercase name, used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::AlreadyVisited => "already_visited",
            Self::OffDomain => "off_domain",
            Self::RobotsDenied => "robots_denied",
            Self::RedirectDuplicate => "redirect_duplicate",
            Self::FetchFailed => "fetch_failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
