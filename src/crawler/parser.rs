//! HTML parser for extracting links and the page title
//!
//! Parsing is lenient: scraper builds a tree out of any input, so these
//! functions never fail. Broken markup simply yields fewer links.

use crate::storage::UNTITLED;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title, or [`UNTITLED`]
    pub title: String,

    /// Absolute http(s) links in document order, without duplicates
    pub links: Vec<String>,
}

/// Parses HTML content and extracts the title and outgoing links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`, resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - Fragment-only hrefs (`#section`)
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Anything that does not resolve to http or https
///
/// # Example
///
/// ```
/// use search_crawler::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: title_of(&document),
        links: links_of(&document, base_url),
    }
}

/// Returns the trimmed `<title>` text, or [`UNTITLED`] when there is none
pub fn extract_title(html: &str) -> String {
    title_of(&Html::parse_document(html))
}

/// Returns the absolute links of a page in document order
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    links_of(&Html::parse_document(html), base_url)
}

fn title_of(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return UNTITLED.to_string();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn links_of(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
