//! URL handling module
//!
//! This module provides URL canonicalization, host extraction, domain
//! matching, and the scope filter that decides which URLs a crawl may visit.

mod domain;
mod matcher;
mod normalize;

use crate::config::RestrictionsConfig;

// Re-export main functions
pub use domain::extract_host;
pub use matcher::matches_domain;
pub use normalize::canonicalize;

/// Decides whether a canonical URL is inside the crawl's scope
///
/// Two checks run in order, and the first failure short-circuits:
/// 1. Domain allow-list: when non-empty, the URL's host must fall under at
///    least one allowed domain. An empty list admits every host.
/// 2. Disallowed paths: any token that is a substring of the URL rejects it.
#[derive(Debug, Clone, Default)]
pub struct ScopeFilter {
    allowed_domains: Vec<String>,
    disallowed_paths: Vec<String>,
}

impl ScopeFilter {
    /// Creates a scope filter from an allow-list and disallowed-path tokens
    pub fn new(allowed_domains: Vec<String>, disallowed_paths: Vec<String>) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
            disallowed_paths,
        }
    }

    /// Builds the filter from the `[restrictions]` config section
    pub fn from_config(config: &RestrictionsConfig) -> Self {
        Self::new(
            config.allowed_domains.clone(),
            config.disallowed_paths.clone(),
        )
    }

    /// Returns true if the crawl may visit `canonical_url`
    ///
    /// # Examples
    ///
    /// ```
    /// use search_crawler::url::ScopeFilter;
    ///
    /// let scope = ScopeFilter::new(vec!["example.com".into()], vec!["private".into()]);
    /// assert!(scope.is_in_scope("http://sub.example.com/x"));
    /// assert!(!scope.is_in_scope("http://other.org/x"));
    /// assert!(!scope.is_in_scope("http://example.com/private/page"));
    /// ```
    pub fn is_in_scope(&self, canonical_url: &str) -> bool {
        self.domain_allowed(canonical_url) && !self.path_disallowed(canonical_url)
    }

    /// Returns true when no allow-list is configured
    pub fn is_open(&self) -> bool {
        self.allowed_domains.is_empty()
    }

    fn domain_allowed(&self, url: &str) -> bool {
        if self.is_open() {
            return true;
        }

        match extract_host(url) {
            Some(host) => self
                .allowed_domains
                .iter()
                .any(|allowed| matches_domain(allowed, &host)),
            None => false,
        }
    }

    fn path_disallowed(&self, url: &str) -> bool {
        self.disallowed_paths
            .iter()
            .any(|token| url.contains(token.as_str()))
    }
}
