/// Checks whether a host falls under an allowed domain
///
/// The host must end with the allowed domain on a label boundary: the
/// domain itself and any of its subdomains match. A leading `*.` or `.` on the
/// allowed entry is ignored, so `*.example.com`, `.example.com` and
/// `example.com` are the same rule.
///
/// Both arguments are expected to be lowercase.
///
/// # Examples
///
/// ```
/// use search_crawler::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com"));
/// assert!(matches_domain("example.com", "sub.example.com"));
/// assert!(!matches_domain("example.com", "other.org"));
/// assert!(!matches_domain("example.com", "notexample.com"));
/// ```
pub fn matches_domain(allowed: &str, host: &str) -> bool {
    let base = allowed
        .strip_prefix("*.")
        .or_else(|| allowed.strip_prefix('.'))
        .unwrap_or(allowed);

    if base.is_empty() {
        return false;
    }

    match host.strip_suffix(base) {
        Some("") => true,
        Some(rest) => rest.ends_with('.'),
        None => false,
    }
}
