use url::Url;

/// Extracts the lowercase host from a URL string
///
/// The port is not part of the result. Returns `None` for strings that do not
/// parse or carry no host (`mailto:`, `data:` and the like).
///
/// # Examples
///
/// ```
/// use search_crawler::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.COM:8080/path"), Some("example.com".to_string()));
/// assert_eq!(extract_host("mailto:someone@example.com"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}
