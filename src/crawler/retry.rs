//! Bounded fetch retries with exponential backoff

use crate::crawler::fetcher::{is_html_content_type, HttpClient};
use std::time::Duration;

/// Default base unit of the backoff sequence
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub content_type: String,
    /// URL after redirects, used as the base for relative links
    pub final_url: String,
}

/// Result of fetching one URL with retries
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// 2xx response with an HTML content type
    Page(FetchedPage),

    /// 2xx response that is not HTML; never retried
    NotHtml { content_type: String },

    /// Every attempt failed
    Failed { attempts: u32, error: String },
}

/// Fetches a URL through an [`HttpClient`], retrying failed attempts
///
/// A transport error or a non-2xx status counts as a failed attempt. Between
/// attempt `k` and `k + 1` (0-based) the retrier sleeps `unit * 2^k`.
pub struct FetchRetrier<C> {
    client: C,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl<C: HttpClient> FetchRetrier<C> {
    /// Creates a retrier making at most `max_attempts` attempts per URL
    pub fn new(client: C, max_attempts: u32) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    /// Replaces the base unit of the backoff sequence
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Sleep before the attempt following the failed attempt `attempt`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .saturating_mul(2u32.saturating_pow(attempt.min(20)))
    }

    /// Fetches `url`, retrying transport errors and non-2xx statuses
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let mut last_error = String::new();

        for attempt in 0..self.max_attempts {
            let error = match self.client.get(url).await {
                Ok(response) if response.is_success() => {
                    if !is_html_content_type(&response.content_type) {
                        return FetchOutcome::NotHtml {
                            content_type: response.content_type,
                        };
                    }
                    return FetchOutcome::Page(FetchedPage {
                        body: response.body,
                        content_type: response.content_type,
                        final_url: response.final_url,
                    });
                }
                Ok(response) => format!("HTTP {}", response.status),
                Err(e) => e.to_string(),
            };

            let attempt_number = attempt + 1;
            if attempt_number < self.max_attempts {
                let wait = self.backoff_delay(attempt);
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                    attempt_number,
                    self.max_attempts,
                    url,
                    error,
                    wait
                );
                tokio::time::sleep(wait).await;
            } else {
                tracing::warn!(
                    "Attempt {}/{} for {} failed: {}. Giving up",
                    attempt_number,
                    self.max_attempts,
                    url,
                    error
                );
            }

            last_error = error;
        }

        FetchOutcome::Failed {
            attempts: self.max_attempts,
            error: last_error,
        }
    }
}
