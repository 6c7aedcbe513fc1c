//! Sitemap reading and discovery
//!
//! Sitemap documents are parsed with quick-xml. `<loc>` under `<url>` is a page,
//! `<loc>` under `<sitemap>` points at a nested sitemap (a sitemap index).
//! [`SitemapReader::read`] follows nested sitemaps and flattens everything into a
//! single de-duplicated page list.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::pacer::{pacing_key, Pacer};
use crate::crawler::record::UniqueList;
use crate::url::normalize;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use url::Url;

/// Nested sitemaps deeper than this are ignored
pub const MAX_SITEMAP_DEPTH: usize = 5;

/// Upper bound on sitemap documents fetched for one `read`
pub const MAX_SITEMAP_DOCUMENTS: usize = 100;

/// Conventional sitemap locations probed by [`SitemapReader::discover`], in order
pub const SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemaps.xml",
];

/// One `<loc>` found in a sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapEntry {
    /// A page URL
    Url(String),
    /// A nested sitemap URL
    Sitemap(String),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Parent {
    None,
    Url,
    Sitemap,
}

/// Parses a sitemap or sitemap-index document
///
/// Malformed XML stops the parse; entries read up to that point are kept.
pub fn parse_sitemap(xml: &str) -> Vec<SitemapEntry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut parent = Parent::None;
    let mut in_loc = false;
    let mut loc = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => parent = Parent::Url,
                b"sitemap" => parent = Parent::Sitemap,
                b"loc" => {
                    in_loc = true;
                    loc.clear();
                }
                _ => {}
            },
            Ok(Event::Text(text)) if in_loc => match text.unescape() {
                Ok(value) => loc.push_str(&value),
                Err(e) => tracing::debug!("Skipping undecodable <loc> text: {}", e),
            },
            Ok(Event::CData(data)) if in_loc => {
                loc.push_str(&String::from_utf8_lossy(&data.into_inner()));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"loc" => {
                    in_loc = false;
                    let value = loc.trim().to_string();
                    if !value.is_empty() {
                        match parent {
                            Parent::Url => entries.push(SitemapEntry::Url(value)),
                            Parent::Sitemap => entries.push(SitemapEntry::Sitemap(value)),
                            Parent::None => {}
                        }
                    }
                }
                b"url" | b"sitemap" => parent = Parent::None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(
                    "Malformed sitemap XML at position {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            _ => {}
        }
    }

    entries
}

/// Reads sitemaps through a [`Fetcher`]
pub struct SitemapReader {
    fetcher: Arc<dyn Fetcher>,
}

impl SitemapReader {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Reads a sitemap and every sitemap nested under it, returning page URLs
    ///
    /// Page URLs are normalized and returned in first-appearance order without
    /// duplicates. Unreachable or unparsable documents are skipped. Each sitemap
    /// document is read at most once, so cyclic indexes terminate. Every document
    /// fetch waits on `pacer` like a page fetch does.
    pub async fn read(&self, sitemap_url: &str, pacer: &mut Pacer) -> Vec<String> {
        let mut pages = UniqueList::new();
        let mut seen_sitemaps = HashSet::new();
        let mut pending = VecDeque::from([(sitemap_url.to_string(), 0usize)]);
        let mut documents = 0usize;

        while let Some((url, depth)) = pending.pop_front() {
            if depth > MAX_SITEMAP_DEPTH {
                tracing::debug!("Sitemap {} is nested too deep, skipping", url);
                continue;
            }
            if !seen_sitemaps.insert(url.clone()) {
                continue;
            }
            if documents >= MAX_SITEMAP_DOCUMENTS {
                tracing::warn!(
                    "Stopped after {} sitemap documents; {} left unread",
                    documents,
                    pending.len() + 1
                );
                break;
            }
            documents += 1;

            let host = pacing_key(&url);
            pacer.wait(&host).await;
            let fetched = self.fetcher.fetch(&url).await;
            pacer.record_completion(&host);

            let body = match fetched {
                Ok(page) => page.body,
                Err(e) => {
                    tracing::warn!("Could not read sitemap {}: {}", url, e);
                    continue;
                }
            };

            let entries = parse_sitemap(&body);
            tracing::debug!("Sitemap {} has {} entries", url, entries.len());

            for entry in entries {
                match entry {
                    SitemapEntry::Url(loc) => {
                        pages.push(normalize(&loc, &url));
                    }
                    SitemapEntry::Sitemap(loc) => {
                        let nested = normalize(&loc, &url);
                        if !nested.is_empty() {
                            pending.push_back((nested, depth + 1));
                        }
                    }
                }
            }
        }

        pages.into_vec()
    }

    /// Probes the conventional sitemap locations of a site
    ///
    /// Returns the first location that answers successfully, or None. Finding no
    /// sitemap is not an error.
    pub async fn discover(&self, base_url: &Url, pacer: &mut Pacer) -> Option<String> {
        let host = pacing_key(base_url.as_str());
        for path in SITEMAP_PATHS {
            let Ok(candidate) = base_url.join(path) else {
                continue;
            };
            pacer.wait(&host).await;
            let found = self.fetcher.probe(candidate.as_str()).await;
            pacer.record_completion(&host);
            if found {
                tracing::info!("Discovered sitemap at {}", candidate);
                return Some(candidate.to_string());
            }
        }

        tracing::debug!("No sitemap found for {}", base_url);
        None
    }
}
