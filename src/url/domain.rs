use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the network location (host plus any explicit port) from a URL
///
/// The host is lowercased. Default ports are not part of the result because the
/// `url` crate drops them while parsing.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use kite_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.test/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.test".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Checks whether `url` shares its network location with `base`
///
/// Scheme and path are ignored. Unparsable input on either side is never
/// considered same-domain.
pub fn same_domain(url: &str, base: &str) -> bool {
    let (Ok(url), Ok(base)) = (Url::parse(url), Url::parse(base)) else {
        return false;
    };

    match (extract_domain(&url), extract_domain(&base)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Parses and validates a crawl base URL
///
/// Unlike [`crate::url::normalize`], this is strict: it is used to reject caller
/// misuse before a crawl starts.
pub fn parse_base_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.test/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.test".to_string()));
    }

    #[test]
    fn test_extract_subdomain() {
        let url = Url::parse("https://blog.example.test/post").unwrap();
        assert_eq!(extract_domain(&url), Some("blog.example.test".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.test:8443/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.test:8443".to_string()));
    }

    #[test]
    fn test_extract_drops_default_port() {
        let url = Url::parse("https://example.test:443/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.test".to_string()));
    }

    #[test]
    fn test_same_domain_ignores_scheme_and_path() {
        assert!(same_domain("http://example.test/a", "https://example.test/b/c"));
        assert!(same_domain("https://Example.TEST/", "https://example.test"));
    }

    #[test]
    fn test_same_domain_rejects_other_hosts() {
        assert!(!same_domain("https://other.test/", "https://example.test/"));
        assert!(!same_domain("https://sub.example.test/", "https://example.test/"));
    }

    #[test]
    fn test_same_domain_respects_port() {
        assert!(!same_domain("http://127.0.0.1:9000/", "http://127.0.0.1:8000/"));
        assert!(same_domain("http://127.0.0.1:8000/x", "http://127.0.0.1:8000/"));
    }

    #[test]
    fn test_same_domain_with_garbage() {
        assert!(!same_domain("", "https://example.test/"));
        assert!(!same_domain("https://example.test/", "not a url"));
    }

    #[test]
    fn test_parse_base_url() {
        assert!(parse_base_url("https://example.test/").is_ok());
        assert!(matches!(
            parse_base_url("ftp://example.test/"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(matches!(parse_base_url("not a url"), Err(UrlError::Parse(_))));
    }
}
