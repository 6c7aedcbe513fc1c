//! Page content extraction
//!
//! Turns a fetched HTML body into a [`PageRecord`]:
//! - Title from the first `<title>` element
//! - Visible text with script/style/noscript/template content left out
//! - Links from `<a href>` plus bare `http(s)://` URLs found in the text
//! - Images from `<img src>` plus inline `background-image: url(...)` styles
//!
//! Every URL goes through [`crate::url::normalize`] and is de-duplicated in
//! first-appearance order. Extraction never fails.

use crate::crawler::record::{PageRecord, UniqueList};
use crate::url::normalize;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Elements whose text content is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Produces a [`PageRecord`] from an HTML body
///
/// Implementations must not panic on malformed input.
pub trait Extractor: Send + Sync {
    fn extract(&self, url: &str, html: &str) -> PageRecord;
}

/// [`Extractor`] backed by the scraper HTML parser
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, url: &str, html: &str) -> PageRecord {
        let mut record = PageRecord::empty(url);

        if !looks_like_markup(html) {
            tracing::debug!("Body of {} is not parseable markup, recording it empty", url);
            return record;
        }

        let document = Html::parse_document(html);
        let base = document_base(&document, url);

        record.title = extract_title(&document);
        record.content = extract_text(&document);
        record.links = extract_links(&document, &record.content, &base);
        record.images = extract_images(&document, &base);
        record
    }
}

/// Cheap sanity check before handing a body to the parser
///
/// html5ever accepts anything, so binary or plain-text bodies have to be caught here.
fn looks_like_markup(body: &str) -> bool {
    !body.contains('\0') && body.contains('<')
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn raw_url_regex() -> &'static Regex {
    static RAW_URL: OnceLock<Regex> = OnceLock::new();
    RAW_URL.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>"'`(){}\[\]|\\^]+"#).expect("raw URL pattern is valid")
    })
}

fn css_url_regex() -> &'static Regex {
    static CSS_URL: OnceLock<Regex> = OnceLock::new();
    CSS_URL.get_or_init(|| {
        Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("CSS url() pattern is valid")
    })
}

/// Resolution base for relative references: `<base href>` if present, else the page URL
fn document_base(document: &Html, url: &str) -> String {
    let Some(base_selector) = selector("base[href]") else {
        return url.to_string();
    };

    // Joined directly: canonical form would drop the trailing slash a base needs
    document
        .select(&base_selector)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| Url::parse(url).ok()?.join(href.trim()).ok())
        .filter(|resolved| matches!(resolved.scheme(), "http" | "https"))
        .map(String::from)
        .unwrap_or_else(|| url.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_title(document: &Html) -> String {
    let Some(title_selector) = selector("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|title| collapse_whitespace(&title.text().collect::<String>()))
        .unwrap_or_default()
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    HIDDEN_ELEMENTS.contains(&element.value().name())
}

fn extract_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(is_hidden);
        if hidden {
            continue;
        }
        text.push_str(fragment);
        text.push(' ');
    }

    collapse_whitespace(&text)
}

fn extract_links(document: &Html, text: &str, base: &str) -> Vec<String> {
    let mut links = UniqueList::new();

    if let Some(anchor_selector) = selector("a[href]") {
        for anchor in document.select(&anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            // Same-page anchors
            if href.trim_start().starts_with('#') {
                continue;
            }
            links.push(normalize(href, base));
        }
    }

    for found in raw_url_regex().find_iter(text) {
        let candidate = found
            .as_str()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\''));
        links.push(normalize(candidate, base));
    }

    links.into_vec()
}

fn extract_images(document: &Html, base: &str) -> Vec<String> {
    let mut images = UniqueList::new();

    if let Some(img_selector) = selector("img[src]") {
        for img in document.select(&img_selector) {
            if let Some(src) = img.value().attr("src") {
                images.push(normalize(src, base));
            }
        }
    }

    if let Some(style_selector) = selector("[style]") {
        for element in document.select(&style_selector) {
            let Some(style) = element.value().attr("style") else {
                continue;
            };
            if !style.to_ascii_lowercase().contains("background") {
                continue;
            }
            for capture in css_url_regex().captures_iter(style) {
                if let Some(reference) = capture.get(1) {
                    images.push(normalize(reference.as_str(), base));
                }
            }
        }
    }

    images.into_vec()
}
