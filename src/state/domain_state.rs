use std::time::{Duration, Instant};

/// Tracks the pacing state of one host during a crawl
///
/// Pacing is measured from the end of the previous fetch to the start of the next,
/// so slow responses do not eat into the courtesy interval.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of fetches completed against this host in the current run
    pub request_count: u32,

    /// When the last fetch to this host finished
    pub last_fetch_end: Option<Instant>,

    /// Crawl-delay announced by the host's robots.txt, if any
    pub robots_delay: Option<Duration>,
}

impl DomainState {
    /// Creates a new DomainState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective delay for this host: the larger of the configured delay and
    /// the robots.txt crawl-delay
    pub fn effective_delay(&self, configured: Duration) -> Duration {
        match self.robots_delay {
            Some(robots) => configured.max(robots),
            None => configured,
        }
    }

    /// Calculates the time until the next fetch may start
    ///
    /// Returns None if a fetch can start now.
    pub fn time_until_next_request(&self, configured: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_fetch_end?;
        let delay = self.effective_delay(configured);
        let elapsed = now.saturating_duration_since(last);
        if elapsed < delay {
            Some(delay - elapsed)
        } else {
            None
        }
    }

    /// Records that a fetch to this host finished at `now`
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_fetch_end = Some(now);
    }
}
