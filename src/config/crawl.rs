//! Immutable per-run crawl configuration
//!
//! [`CrawlConfig`] is what the frontier actually runs with. It is derived once from the
//! file configuration (or built in code) and never mutated during a run.

use crate::config::types::Config;
use crate::url::parse_base_url;
use crate::{ConfigError, ConfigResult};
use std::time::Duration;
use url::Url;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a single crawl run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Domain-restriction anchor and sitemap-discovery base
    pub base_url: Url,

    /// BFS depth bound; 0 = seeds only
    pub max_depth: u32,

    /// Minimum spacing between fetches to the same host
    pub delay: Duration,

    /// Enable robots.txt checks
    pub respect_robots: bool,

    /// Sent on every fetch; its product token is used for robots matching
    pub user_agent: String,

    /// Consult the sitemap while seeding
    pub use_sitemap: bool,

    /// Only traverse URLs sharing the base URL's network location
    pub restrict_to_domain: bool,

    /// Bound on a single request
    pub request_timeout: Duration,

    /// Stop after this many page records
    pub max_pages: Option<usize>,
}

impl CrawlConfig {
    /// Create a new builder for the given base URL
    pub fn builder(base_url: impl Into<String>) -> CrawlConfigBuilder {
        CrawlConfigBuilder::new(base_url)
    }

    /// Derives the run configuration from a loaded file configuration
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let crawler = &config.crawler;
        let max_pages = match crawler.max_pages {
            0 => None,
            n => Some(n as usize),
        };

        Self::builder(crawler.base_url.clone())
            .max_depth(crawler.max_depth)
            .delay(Duration::from_millis(crawler.delay_ms))
            .respect_robots(crawler.respect_robots)
            .use_sitemap(crawler.use_sitemap)
            .restrict_to_domain(crawler.same_domain_only)
            .request_timeout(Duration::from_secs(crawler.request_timeout_secs))
            .max_pages(max_pages)
            .user_agent(config.user_agent.header_value())
            .build()
    }

    /// The robots.txt product token: the user agent up to the first `/` or space
    pub fn robots_token(&self) -> &str {
        robots_token(&self.user_agent)
    }
}

/// Extracts the product token from a user agent string
pub fn robots_token(user_agent: &str) -> &str {
    let token = user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or("");
    if token.is_empty() {
        "*"
    } else {
        token
    }
}

/// Builder for CrawlConfig
#[derive(Debug)]
pub struct CrawlConfigBuilder {
    base_url: String,
    max_depth: u32,
    delay: Duration,
    respect_robots: bool,
    user_agent: String,
    use_sitemap: bool,
    restrict_to_domain: bool,
    request_timeout: Duration,
    max_pages: Option<usize>,
}

impl CrawlConfigBuilder {
    /// Create a new builder with polite defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_depth: 2,
            delay: Duration::from_millis(500),
            respect_robots: true,
            user_agent: format!("kite-crawler/{}", env!("CARGO_PKG_VERSION")),
            use_sitemap: false,
            restrict_to_domain: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_pages: None,
        }
    }

    /// Set the maximum depth to crawl
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the delay between fetches
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set whether to respect robots.txt
    pub fn respect_robots(mut self, respect_robots: bool) -> Self {
        self.respect_robots = respect_robots;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set whether to seed from the sitemap
    pub fn use_sitemap(mut self, use_sitemap: bool) -> Self {
        self.use_sitemap = use_sitemap;
        self
    }

    /// Set whether to stay on the base URL's network location
    pub fn restrict_to_domain(mut self, restrict_to_domain: bool) -> Self {
        self.restrict_to_domain = restrict_to_domain;
        self
    }

    /// Set the per-request timeout
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set the maximum number of page records
    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> ConfigResult<CrawlConfig> {
        let base_url = parse_base_url(&self.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user agent cannot be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        if self.max_pages == Some(0) {
            return Err(ConfigError::Validation(
                "max pages must be at least 1 when set".to_string(),
            ));
        }

        Ok(CrawlConfig {
            base_url,
            max_depth: self.max_depth,
            delay: self.delay,
            respect_robots: self.respect_robots,
            user_agent: self.user_agent,
            use_sitemap: self.use_sitemap,
            restrict_to_domain: self.restrict_to_domain,
            request_timeout: self.request_timeout,
            max_pages: self.max_pages,
        })
    }
}
