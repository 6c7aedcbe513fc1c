//! Per-host request pacing
//!
//! The crawl loop is single-threaded, so pacing is a plain sleep on the control
//! task: before each fetch the pacer waits until the host's delay has elapsed since
//! the previous fetch to that host finished.

use crate::state::DomainState;
use crate::url::extract_domain;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

/// Pacing key for a URL; unparsable URLs share one bucket
pub fn pacing_key(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| extract_domain(&parsed))
        .unwrap_or_default()
}

/// Tracks pacing state for every host touched in a run
#[derive(Debug)]
pub struct Pacer {
    /// Configured minimum spacing between fetches to one host
    delay: Duration,

    /// Per-host pacing state
    hosts: HashMap<String, DomainState>,
}

impl Pacer {
    /// Creates a pacer with the configured inter-request delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            hosts: HashMap::new(),
        }
    }

    /// Records a robots.txt crawl-delay for a host
    ///
    /// The effective delay for the host becomes the larger of the two.
    pub fn set_robots_delay(&mut self, host: &str, delay: Duration) {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(DomainState::new)
            .robots_delay = Some(delay);
    }

    /// Delay currently applied to a host
    pub fn delay_for(&self, host: &str) -> Duration {
        self.hosts
            .get(host)
            .map_or(self.delay, |state| state.effective_delay(self.delay))
    }

    /// Waits until a fetch to `host` may start
    ///
    /// Returns how long it slept.
    pub async fn wait(&mut self, host: &str) -> Duration {
        let Some(state) = self.hosts.get(host) else {
            return Duration::ZERO;
        };
        let Some(remaining) = state.time_until_next_request(self.delay, Instant::now()) else {
            return Duration::ZERO;
        };

        tracing::debug!("Pacing {} for {:?}", host, remaining);
        tokio::time::sleep(remaining).await;
        remaining
    }

    /// Records that a fetch to `host` has just finished
    pub fn record_completion(&mut self, host: &str) {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(DomainState::new)
            .record_request(Instant::now());
    }

    /// Number of completed fetches to a host
    pub fn request_count(&self, host: &str) -> u32 {
        self.hosts.get(host).map_or(0, |state| state.request_count)
    }
}
