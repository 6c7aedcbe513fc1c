//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML content extraction behind the [`Extractor`] trait
//! - Sitemap reading and discovery
//! - Per-host pacing
//! - The breadth-first [`Frontier`] and its result [`Aggregator`]

mod aggregator;
mod extractor;
mod fetcher;
mod frontier;
mod pacer;
mod record;
mod sitemap;

pub use aggregator::{Aggregator, CrawlResult, CrawlStats};
pub use extractor::{Extractor, HtmlExtractor};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher, MAX_REDIRECTS};
pub use frontier::{Frontier, FrontierEntry, FrontierState};
pub use pacer::Pacer;
pub use record::{PageRecord, UniqueList, CONTENT_TYPE_HTML};
pub use sitemap::{parse_sitemap, SitemapEntry, SitemapReader, MAX_SITEMAP_DEPTH, SITEMAP_PATHS};

use crate::config::CrawlConfig;
use crate::robots::HttpRobotsProvider;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client from the configured user agent and timeout
/// 2. Seed the frontier from `seeds` and, if enabled, the site's sitemaps
/// 3. Drain the frontier breadth-first up to the depth bound
/// 4. Return the collected records and counters
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `seeds` - Priority URLs to start from; the base URL is used when empty
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed (individual fetch failures are not errors)
/// * `Err(KiteError)` - The HTTP client could not be built
pub async fn run_crawl(config: CrawlConfig, seeds: Vec<String>) -> crate::Result<CrawlResult> {
    run_crawl_until(config, seeds, Arc::new(AtomicBool::new(false))).await
}

/// Runs a crawl that stops early once `stop` is set
///
/// Records gathered before the stop are returned.
pub async fn run_crawl_until(
    config: CrawlConfig,
    seeds: Vec<String>,
    stop: Arc<AtomicBool>,
) -> crate::Result<CrawlResult> {
    tracing::info!(
        "Starting crawl of {} (max depth {}, delay {:?})",
        config.base_url,
        config.max_depth,
        config.delay
    );

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::with_user_agent(
        &config.user_agent,
        config.request_timeout,
    )?);
    let robots = Arc::new(HttpRobotsProvider::new(Arc::clone(&fetcher)));
    let extractor = Arc::new(HtmlExtractor::new());

    let mut frontier = Frontier::new(config, fetcher, robots, extractor).with_stop_signal(stop);
    frontier.seed(&seeds).await;

    Ok(frontier.run().await)
}
