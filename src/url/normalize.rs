use url::Url;

/// Canonicalizes a raw URL reference against a base URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; an empty reference is unusable
/// 2. Resolve `raw` against `base` (absolute references pass through)
/// 3. Reject anything that is not HTTP(S) with a host
/// 4. Remove fragment (everything after #) and an empty query (trailing ?)
/// 5. Remove trailing slashes from the path (the root `/` is kept)
///
/// This function never fails. A reference that cannot be turned into a usable
/// HTTP(S) URL yields the empty string, which callers treat as "skip".
///
/// # Examples
///
/// ```
/// use kite_crawler::url::normalize;
///
/// assert_eq!(
///     normalize("../b/#top", "https://example.test/a/c"),
///     "https://example.test/b"
/// );
/// assert_eq!(normalize("mailto:me@example.test", "https://example.test/"), "");
/// ```
pub fn normalize(raw: &str, base: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let resolved = match Url::parse(base.trim()) {
        Ok(base_url) => base_url.join(raw),
        Err(_) => Url::parse(raw),
    };

    match resolved {
        Ok(url) => canonicalize(url).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Applies the canonical-form rules to an already-absolute URL
///
/// Returns None when the URL is not something the crawler can fetch.
pub(crate) fn canonicalize(mut url: Url) -> Option<String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    if url.host_str().map_or(true, str::is_empty) {
        return None;
    }

    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    Some(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.test/docs/guide";

    #[test]
    fn test_absolute_url_passes_through() {
        assert_eq!(
            normalize("https://other.test/page", BASE),
            "https://other.test/page"
        );
    }

    #[test]
    fn test_resolve_root_relative() {
        assert_eq!(normalize("/about", BASE), "https://example.test/about");
    }

    #[test]
    fn test_resolve_path_relative() {
        assert_eq!(normalize("intro", BASE), "https://example.test/docs/intro");
    }

    #[test]
    fn test_resolve_parent_segments() {
        assert_eq!(normalize("../blog/post", BASE), "https://example.test/blog/post");
    }

    #[test]
    fn test_protocol_relative() {
        assert_eq!(
            normalize("//cdn.example.test/img.png", BASE),
            "https://cdn.example.test/img.png"
        );
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(
            normalize("https://example.test/page#section", BASE),
            "https://example.test/page"
        );
    }

    #[test]
    fn test_fragment_only_resolves_to_base() {
        assert_eq!(normalize("#top", BASE), "https://example.test/docs/guide");
    }

    #[test]
    fn test_remove_trailing_slash() {
        assert_eq!(
            normalize("https://example.test/page/", BASE),
            "https://example.test/page"
        );
    }

    #[test]
    fn test_keep_root_slash() {
        assert_eq!(normalize("https://example.test/", BASE), "https://example.test/");
        assert_eq!(normalize("https://example.test", BASE), "https://example.test/");
    }

    #[test]
    fn test_keep_query() {
        assert_eq!(
            normalize("/search/?q=rust", BASE),
            "https://example.test/search?q=rust"
        );
    }

    #[test]
    fn test_drop_empty_query() {
        assert_eq!(normalize("/page?", BASE), "https://example.test/page");
    }

    #[test]
    fn test_lowercase_host() {
        assert_eq!(
            normalize("https://EXAMPLE.test/Page", BASE),
            "https://example.test/Page"
        );
    }

    #[test]
    fn test_non_http_schemes_are_unusable() {
        assert_eq!(normalize("mailto:someone@example.test", BASE), "");
        assert_eq!(normalize("javascript:void(0)", BASE), "");
        assert_eq!(normalize("ftp://example.test/file", BASE), "");
        assert_eq!(normalize("data:text/plain,hi", BASE), "");
    }

    #[test]
    fn test_empty_input_is_unusable() {
        assert_eq!(normalize("", BASE), "");
        assert_eq!(normalize("   ", BASE), "");
    }

    #[test]
    fn test_malformed_base_falls_back_to_raw() {
        assert_eq!(
            normalize("https://example.test/a/", "not a url"),
            "https://example.test/a"
        );
        assert_eq!(normalize("/relative", "not a url"), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "/a/b/",
            "../up//",
            "https://example.test/x/?",
            "page#frag",
            "https://example.test:8080/p/",
            "?q=1#x",
            "//example.test",
            "https://example.test/a//",
        ];

        for raw in inputs {
            let once = normalize(raw, BASE);
            let twice = normalize(&once, BASE);
            assert_eq!(once, twice, "normalize was not idempotent for {}", raw);
        }
    }
}
