//! HTTP fetcher implementation
//!
//! This module defines the narrow HTTP interface the crawler consumes and its
//! reqwest-backed implementation:
//! - Building HTTP clients with the configured identity headers
//! - Per-attempt timeouts
//! - Redirect following
//! - Error classification

use crate::config::LogicConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// `Accept` header sent with every request
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Maximum number of redirects followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Errors raised below the HTTP status level
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },
}

/// A response as seen by the crawler
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value (empty when absent)
    pub content_type: String,
    /// Response body
    pub body: String,
    /// URL after following redirects
    pub final_url: String,
}

impl HttpResponse {
    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP interface the crawler fetches through
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs one GET request, following redirects
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Returns true if a Content-Type names an HTML document
///
/// # Examples
///
/// ```
/// use search_crawler::crawler::is_html_content_type;
///
/// assert!(is_html_content_type("text/html; charset=utf-8"));
/// assert!(is_html_content_type("application/xhtml+xml"));
/// assert!(!is_html_content_type("application/pdf"));
/// ```
pub fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

/// reqwest-backed [`HttpClient`]
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Wraps an already configured reqwest client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the `[logic]` config section
    pub fn from_config(config: &LogicConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

/// Builds an HTTP client with the crawler's identity and timeouts
///
/// # Arguments
///
/// * `config` - The `[logic]` configuration section
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use search_crawler::config::LogicConfig;
/// use search_crawler::crawler::build_http_client;
///
/// let client = build_http_client(&LogicConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &LogicConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    } else {
        tracing::warn!(
            "Ignoring invalid accept-language value: {}",
            config.accept_language
        );
    }

    let timeout = config.timeout();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

#[async_trait]
impl HttpClient for ReqwestClient {
    /// Sends a GET request
    ///
    /// The body is only read for 2xx responses with an HTML content type;
    /// otherwise it is left empty so large non-HTML payloads are not downloaded.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = if status.is_success() && is_html_content_type(&content_type) {
            response.text().await.map_err(|e| classify_error(url, e))?
        } else {
            String::new()
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            content_type,
            body,
            final_url,
        })
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
