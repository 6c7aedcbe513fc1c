//! The crawl frontier and traversal loop
//!
//! A [`Frontier`] owns everything that lives for one run: the FIFO queue of
//! [`FrontierEntry`] values, the visited set, the robots cache, per-host pacing and
//! the result aggregator. Network access, robots loading and content extraction
//! are injected so tests can swap them for fakes.
//!
//! The loop is single-threaded and cooperative. One entry is fetched, extracted and
//! its discoveries enqueued before the next entry is popped, so the visited set and
//! the aggregator need no locking.

use crate::config::CrawlConfig;
use crate::crawler::aggregator::{Aggregator, CrawlResult};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::pacer::{pacing_key, Pacer};
use crate::crawler::record::UniqueList;
use crate::crawler::sitemap::SitemapReader;
use crate::robots::{RobotsCache, RobotsProvider};
use crate::state::{PageState, VisitedSet};
use crate::url::{normalize, same_domain};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Log a progress line every this many processed entries
const PROGRESS_INTERVAL: usize = 10;

/// A URL waiting to be processed, with its BFS distance from the nearest seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Lifecycle of a frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierState {
    /// Initial queue is being populated
    Seeding,
    /// Entries are being popped and processed
    Draining,
    /// Queue is empty, or the run was stopped
    Done,
}

/// Breadth-first, depth-bounded traversal engine
pub struct Frontier {
    config: CrawlConfig,
    base: String,
    fetcher: Arc<dyn Fetcher>,
    robots_provider: Arc<dyn RobotsProvider>,
    extractor: Arc<dyn Extractor>,
    queue: VecDeque<FrontierEntry>,
    visited: VisitedSet,
    robots: RobotsCache,
    pacer: Pacer,
    aggregator: Aggregator,
    state: FrontierState,
    seeded: bool,
    stop: Option<Arc<AtomicBool>>,
}

impl Frontier {
    /// Creates a frontier for one run
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        robots_provider: Arc<dyn RobotsProvider>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        let base = config.base_url.to_string();
        let pacer = Pacer::new(config.delay);

        Self {
            config,
            base,
            fetcher,
            robots_provider,
            extractor,
            queue: VecDeque::new(),
            visited: VisitedSet::new(),
            robots: RobotsCache::new(),
            pacer,
            aggregator: Aggregator::new(),
            state: FrontierState::Seeding,
            seeded: false,
            stop: None,
        }
    }

    /// Installs a stop flag checked between dequeues
    ///
    /// Setting the flag ends the run early; everything recorded so far is still returned.
    pub fn with_stop_signal(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Starts the run with URLs the caller already handled
    pub fn with_visited(mut self, visited: VisitedSet) -> Self {
        self.visited = visited;
        self
    }

    pub fn state(&self) -> FrontierState {
        self.state
    }

    /// Number of entries waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Entries currently queued, front first
    pub fn pending(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.queue.iter()
    }

    /// Populates the queue at depth 0
    ///
    /// Explicit seeds come first, then sitemap URLs when sitemaps are enabled. With
    /// neither, the base URL is the only seed. Returns the number of entries queued.
    pub async fn seed(&mut self, seeds: &[String]) -> usize {
        self.state = FrontierState::Seeding;
        self.seeded = true;

        let mut initial = UniqueList::new();
        for seed in seeds {
            let url = normalize(seed, &self.base);
            if url.is_empty() {
                tracing::warn!("Ignoring unusable seed URL: {}", seed);
                continue;
            }
            initial.push(url);
        }
        let explicit = initial.len();

        if self.config.use_sitemap {
            initial.extend(self.sitemap_urls().await);
        }
        let from_sitemap = initial.len() - explicit;

        if initial.is_empty() {
            if let Some(base) = crate::url::canonicalize(self.config.base_url.clone()) {
                initial.push(base);
            }
        }

        let queued = initial.len();
        for url in initial.into_vec() {
            self.queue.push_back(FrontierEntry::new(url, 0));
        }

        tracing::info!(
            "Seeded frontier with {} URLs ({} explicit, {} from sitemap)",
            queued,
            explicit,
            from_sitemap
        );
        queued
    }

    /// Drains the queue and returns the collected result
    ///
    /// Seeds from the base URL (and sitemap, if enabled) when [`Frontier::seed`] was
    /// not called.
    pub async fn run(mut self) -> CrawlResult {
        self.drain().await;
        self.finish()
    }

    /// Processes entries until the queue is empty, the page limit is hit or a stop
    /// is requested; the frontier is [`FrontierState::Done`] afterwards
    pub async fn drain(&mut self) {
        if !self.seeded {
            self.seed(&[]).await;
        }

        self.state = FrontierState::Draining;
        let started = Instant::now();
        let mut handled = 0usize;

        loop {
            if self.stop_requested() {
                tracing::info!(
                    "Stop requested; returning {} records with {} entries still queued",
                    self.aggregator.record_count(),
                    self.queue.len()
                );
                self.aggregator.mark_cancelled();
                break;
            }

            let Some(entry) = self.queue.pop_front() else {
                break;
            };

            let outcome = self.process(entry).await;
            self.aggregator.record_outcome(outcome);
            handled += 1;

            if handled % PROGRESS_INTERVAL == 0 {
                let elapsed = started.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 {
                    self.aggregator.record_count() as f64 / elapsed
                } else {
                    0.0
                };
                tracing::info!(
                    "Progress: {} pages scraped, {} queued, {:.2} pages/sec",
                    self.aggregator.record_count(),
                    self.queue.len(),
                    rate
                );
            }

            if let Some(max_pages) = self.config.max_pages {
                if self.aggregator.record_count() >= max_pages {
                    tracing::info!("Reached page limit of {}", max_pages);
                    break;
                }
            }
        }

        self.state = FrontierState::Done;
        tracing::info!(
            "Crawl finished: {} pages scraped, {} URLs visited in {:.1}s",
            self.aggregator.record_count(),
            self.visited.len(),
            started.elapsed().as_secs_f64()
        );
    }

    /// Consumes the frontier and returns everything collected
    pub fn finish(self) -> CrawlResult {
        self.aggregator.finalize(&self.visited)
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.load(Ordering::SeqCst))
    }

    /// Runs one entry through the per-entry steps and reports its outcome
    async fn process(&mut self, entry: FrontierEntry) -> PageState {
        let FrontierEntry { url, depth } = entry;

        if self.visited.contains(&url) {
            tracing::debug!("Skipping {}: already visited", url);
            return PageState::AlreadyVisited;
        }

        if self.config.restrict_to_domain && !same_domain(&url, &self.base) {
            tracing::debug!("Skipping {}: outside {}", url, self.base);
            return PageState::OffDomain;
        }

        if self.config.respect_robots && !self.robots_allow(&url).await {
            tracing::debug!("Skipping {}: disallowed by robots.txt", url);
            return PageState::RobotsDenied;
        }

        self.visited.mark(&url);

        let host = pacing_key(&url);
        self.pacer.wait(&host).await;
        let fetched = self.fetcher.fetch(&url).await;
        self.pacer.record_completion(&host);

        let page = match fetched {
            Ok(page) if page.is_html() => page,
            Ok(page) => {
                let error = FetchError::UnsupportedContent {
                    url: url.clone(),
                    content_type: page.content_type.unwrap_or_default(),
                };
                tracing::warn!("{}", error);
                return PageState::FetchFailed;
            }
            Err(error) => {
                tracing::warn!("Fetch failed: {}", error);
                return PageState::FetchFailed;
            }
        };

        let final_url = match normalize(&page.final_url, &url) {
            resolved if resolved.is_empty() => url.clone(),
            resolved => resolved,
        };

        if final_url != url {
            if self.config.restrict_to_domain && !same_domain(&final_url, &self.base) {
                tracing::debug!("Dropping {}: redirected off-site to {}", url, final_url);
                return PageState::RedirectDuplicate;
            }
            if !self.visited.mark(&final_url) {
                tracing::debug!("Dropping {}: redirected to visited {}", url, final_url);
                return PageState::RedirectDuplicate;
            }
        }

        let mut record = self.extractor.extract(&final_url, &page.body);
        record.depth = depth;
        tracing::debug!(
            "Recorded {} at depth {} ({} links, {} images)",
            final_url,
            depth,
            record.links.len(),
            record.images.len()
        );

        if depth < self.config.max_depth {
            for link in &record.links {
                if self.should_enqueue(link) {
                    tracing::trace!("Queueing {} at depth {}", link, depth + 1);
                    self.queue.push_back(FrontierEntry::new(link.clone(), depth + 1));
                }
            }
        }

        self.aggregator.add_record(record);
        PageState::Processed
    }

    fn should_enqueue(&self, link: &str) -> bool {
        if link.is_empty() || self.visited.contains(link) {
            return false;
        }
        !self.config.restrict_to_domain || same_domain(link, &self.base)
    }

    /// Consults the cached robots policy for the URL's host, loading it on first use
    async fn robots_allow(&mut self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return true;
        };

        self.ensure_robots(&parsed).await;
        self.robots
            .get(&parsed)
            .map_or(true, |policy| policy.is_allowed(url, self.config.robots_token()))
    }

    /// Loads the robots policy for a host once, paced like any other fetch
    ///
    /// A declared crawl-delay is applied to the host from then on.
    async fn ensure_robots(&mut self, url: &Url) {
        if self.robots.get(url).is_some() {
            return;
        }

        let host = pacing_key(url.as_str());
        self.pacer.wait(&host).await;
        let (policy, _) = self
            .robots
            .get_or_load(self.robots_provider.as_ref(), url)
            .await;
        let crawl_delay = policy.crawl_delay_duration(self.config.robots_token());
        self.pacer.record_completion(&host);

        if let Some(delay) = crawl_delay {
            tracing::info!("Honoring robots.txt crawl-delay of {:?} for {}", delay, host);
            self.pacer.set_robots_delay(&host, delay);
        }
    }

    /// Page URLs from the site's sitemaps
    ///
    /// Sitemaps declared in robots.txt are read first; the conventional locations are
    /// probed only when robots.txt declares none. Sitemap fetches share the page pacing.
    async fn sitemap_urls(&mut self) -> Vec<String> {
        let reader = SitemapReader::new(Arc::clone(&self.fetcher));
        let base = self.config.base_url.clone();

        let mut declared = Vec::new();
        if self.config.respect_robots {
            self.ensure_robots(&base).await;
            if let Some(policy) = self.robots.get(&base) {
                declared = policy.sitemaps();
            }
        }

        if declared.is_empty() {
            if let Some(found) = reader.discover(&base, &mut self.pacer).await {
                declared.push(found);
            }
        }

        let mut urls = UniqueList::new();
        for sitemap in &declared {
            let pages = reader.read(sitemap, &mut self.pacer).await;
            tracing::info!("Sitemap {} listed {} pages", sitemap, pages.len());
            urls.extend(pages);
        }
        urls.into_vec()
    }
}
