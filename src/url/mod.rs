//! URL handling module for Kite
//!
//! This module provides URL canonicalization and the same-domain check that
//! bounds a crawl to its target site.

mod domain;
mod normalize;

pub use domain::{extract_domain, parse_base_url, same_domain};
pub use normalize::normalize;

pub(crate) use normalize::canonicalize;
