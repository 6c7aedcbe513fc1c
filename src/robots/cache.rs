//! Run-scoped robots.txt cache
//!
//! A policy is loaded at most once per network location and reused for the rest of
//! the run; nothing here ever re-fetches.

use crate::robots::{ParsedRobots, RobotsProvider};
use crate::url::extract_domain;
use std::collections::HashMap;
use url::Url;

/// Cached robots.txt policies keyed by network location
#[derive(Debug, Default)]
pub struct RobotsCache {
    policies: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached policy for a URL's network location, if one was loaded
    pub fn get(&self, url: &Url) -> Option<&ParsedRobots> {
        self.policies.get(&extract_domain(url)?)
    }

    /// Returns the policy for a URL's host, loading it through `provider` on first use
    ///
    /// The boolean is `true` when this call performed the load.
    pub async fn get_or_load(
        &mut self,
        provider: &dyn RobotsProvider,
        url: &Url,
    ) -> (&ParsedRobots, bool) {
        let domain = extract_domain(url).unwrap_or_default();

        let loaded = !self.policies.contains_key(&domain);
        if loaded {
            tracing::debug!("Loading robots.txt for {}", domain);
            let policy = provider.load(url).await;
            self.policies.insert(domain.clone(), policy);
        }

        let policy = self
            .policies
            .entry(domain)
            .or_insert_with(ParsedRobots::allow_all);
        (policy, loaded)
    }

    /// Number of hosts with a cached policy
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns whether no policy has been loaded yet
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl RobotsProvider for CountingProvider {
        async fn load(&self, _base_url: &Url) -> ParsedRobots {
            self.loads.fetch_add(1, Ordering::SeqCst);
            ParsedRobots::from_content("User-agent: *\nDisallow: /admin")
        }
    }

    #[tokio::test]
    async fn test_policy_loaded_once_per_host() {
        let provider = CountingProvider {
            loads: AtomicUsize::new(0),
        };
        let mut cache = RobotsCache::new();

        let first = Url::parse("https://example.test/a").unwrap();
        let second = Url::parse("https://example.test/b/c").unwrap();

        let (_, loaded) = cache.get_or_load(&provider, &first).await;
        assert!(loaded);
        let (policy, loaded) = cache.get_or_load(&provider, &second).await;
        assert!(!loaded);
        assert!(!policy.is_allowed("/admin", "KiteCrawler"));

        assert_eq!(provider.loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_each_host_gets_its_own_policy() {
        let provider = CountingProvider {
            loads: AtomicUsize::new(0),
        };
        let mut cache = RobotsCache::new();

        for raw in ["https://a.test/", "https://b.test/", "http://a.test:8080/"] {
            let url = Url::parse(raw).unwrap();
            cache.get_or_load(&provider, &url).await;
        }

        assert_eq!(provider.loads.load(Ordering::SeqCst), 3);
        assert!(cache.get(&Url::parse("https://a.test/x").unwrap()).is_some());
        assert!(cache.get(&Url::parse("https://c.test/").unwrap()).is_none());
    }
}
