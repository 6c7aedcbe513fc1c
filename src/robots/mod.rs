//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Robots absence never blocks a crawl: any fetch failure yields a permissive policy.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{ParsedRobots, MAX_CRAWL_DELAY};

use crate::crawler::Fetcher;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Source of robots.txt policies
///
/// The frontier only talks to this trait, so tests can substitute a fixed policy.
#[async_trait]
pub trait RobotsProvider: Send + Sync {
    /// Loads the policy for the site `base_url` belongs to
    ///
    /// Implementations must not fail: when no policy can be obtained they return
    /// [`ParsedRobots::allow_all`].
    async fn load(&self, base_url: &Url) -> ParsedRobots;
}

/// Loads `/robots.txt` over HTTP through a [`Fetcher`]
pub struct HttpRobotsProvider {
    fetcher: Arc<dyn Fetcher>,
}

impl HttpRobotsProvider {
    /// Creates a provider that fetches robots.txt with the given fetcher
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl RobotsProvider for HttpRobotsProvider {
    async fn load(&self, base_url: &Url) -> ParsedRobots {
        let Some(robots_url) = robots_url(base_url) else {
            return ParsedRobots::allow_all();
        };

        match self.fetcher.fetch(robots_url.as_str()).await {
            Ok(page) => {
                tracing::debug!("Fetched {} ({} bytes)", robots_url, page.body.len());
                ParsedRobots::from_content(&page.body)
            }
            Err(e) => {
                tracing::debug!("No usable robots.txt at {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        }
    }
}

/// Provider that hands out the same policy for every site
///
/// Useful when a caller already holds the robots.txt content.
#[derive(Debug, Clone)]
pub struct StaticRobotsProvider {
    policy: ParsedRobots,
}

impl StaticRobotsProvider {
    /// Creates a provider from raw robots.txt content
    pub fn new(content: &str) -> Self {
        Self {
            policy: ParsedRobots::from_content(content),
        }
    }
}

#[async_trait]
impl RobotsProvider for StaticRobotsProvider {
    async fn load(&self, _base_url: &Url) -> ParsedRobots {
        self.policy.clone()
    }
}

/// Returns the robots.txt URL for the site a URL belongs to
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}
