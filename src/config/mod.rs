//! Configuration module for Kite
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and deriving the immutable [`CrawlConfig`] a crawl run executes with.
//!
//! # Example
//!
//! ```no_run
//! use kite_crawler::config::{load_config, CrawlConfig};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! let crawl = CrawlConfig::from_config(&config).unwrap();
//! println!("Crawler will use max depth: {}", crawl.max_depth);
//! ```

mod crawl;
mod parser;
mod types;
mod validation;

// Re-export types
pub use crawl::{robots_token, CrawlConfig, CrawlConfigBuilder, DEFAULT_REQUEST_TIMEOUT};
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
