//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the crawler's user agent and timeout
//! - GET requests that transparently follow redirects
//! - HEAD probes used for sitemap discovery
//! - Error classification into [`FetchError`]

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirects followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// Upper bound on the TCP connect phase
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on a declared Content-Length; larger responses are not downloaded
pub const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// A successfully fetched resource
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,
    /// Response body
    pub body: String,
}

impl FetchedPage {
    /// Returns whether the response is (or may be) an HTML document
    ///
    /// A missing Content-Type header is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match &self.content_type {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.contains("text/html") || content_type.contains("application/xhtml")
            }
            None => true,
        }
    }
}

/// Reasons a single fetch can fail
///
/// None of these are fatal to a crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Unsupported content type '{content_type}' at {url}")]
    UnsupportedContent { url: String, content_type: String },

    #[error("Body of {url} is {bytes} bytes, over the {limit} byte limit")]
    TooLarge { url: String, bytes: u64, limit: u64 },
}

impl FetchError {
    /// Classifies a reqwest error
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            FetchError::Timeout { url }
        } else if error.is_connect() {
            FetchError::Connect {
                url,
                message: error.to_string(),
            }
        } else if error.is_redirect() {
            FetchError::RedirectLimit { url }
        } else if error.is_body() || error.is_decode() {
            FetchError::Body {
                url,
                message: error.to_string(),
            }
        } else {
            FetchError::Request {
                url,
                message: error.to_string(),
            }
        }
    }
}

/// Network access used by the crawler
///
/// The frontier, the robots provider and the sitemap reader all fetch through this
/// trait, so a fake implementation can stand in for the network in tests.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a GET for `url`, following redirects
    ///
    /// Any non-2xx final status is an error.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Lightweight existence check; true if the resource answers with 2xx
    async fn probe(&self, url: &str) -> bool;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Sent as the User-Agent header on every request
/// * `timeout` - Bound on each whole request
///
/// # Example
///
/// ```no_run
/// use kite_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("KiteCrawler/0.1", Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns whether a Content-Type names a textual document worth downloading
///
/// Pages, robots.txt and sitemaps are all text or XML; anything else is skipped
/// before its body is read.
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.is_empty()
        || mime.starts_with("text/")
        || mime == "application/xml"
        || mime.ends_with("+xml")
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: u64,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    /// Sets the largest declared Content-Length that will be downloaded
    pub fn with_max_body_bytes(mut self, limit: u64) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Builds a fetcher with the given user agent and request timeout
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, timeout)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(content_type) = content_type.as_deref().filter(|ct| !is_textual(ct)) {
            return Err(FetchError::UnsupportedContent {
                url: final_url,
                content_type: content_type.to_string(),
            });
        }

        if let Some(bytes) = response
            .content_length()
            .filter(|bytes| *bytes > self.max_body_bytes)
        {
            return Err(FetchError::TooLarge {
                url: final_url,
                bytes,
                limit: self.max_body_bytes,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&final_url, e))?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    async fn probe(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => true,
            // Some servers refuse HEAD outright; fall back to a GET
            Ok(response) if response.status() == StatusCode::METHOD_NOT_ALLOWED => self
                .client
                .get(url)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false),
            Ok(_) => false,
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", url, e);
                false
            }
        }
    }
}
