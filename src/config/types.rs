use serde::Deserialize;
use std::time::Duration;

/// Default `Accept-Language` header sent with every request
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document store connection
    pub db: DbConfig,

    /// Ordered list of starting URLs
    pub seeds: Vec<String>,

    /// Timing and politeness knobs
    pub logic: LogicConfig,

    /// Scope restrictions
    pub restrictions: RestrictionsConfig,
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Path to the SQLite database file (`:memory:` for a throwaway store)
    pub path: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: "crawler.db".to_string(),
        }
    }
}

/// Crawl loop behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogicConfig {
    /// Pause between two requests (seconds)
    pub delay: f64,

    /// Maximum number of URLs processed in one run
    pub max_pages: u64,

    /// Minimum time between two fetches of the same URL (seconds)
    pub revisit_interval: i64,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Per-attempt fetch timeout (seconds)
    pub timeout: u64,

    /// Maximum fetch attempts per URL
    pub max_retries: u32,

    /// How far a stored record is pushed back after a failed re-fetch (seconds)
    pub failure_backoff: i64,

    /// Value of the `Accept-Language` header
    pub accept_language: String,
}

impl Default for LogicConfig {
    fn default() -> Self {
        Self {
            delay: 1.0,
            max_pages: 1000,
            revisit_interval: 604_800,
            user_agent: "SearchCrawler/1.0".to_string(),
            timeout: 10,
            max_retries: 3,
            failure_backoff: 3600,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

impl LogicConfig {
    /// Inter-request delay as a `Duration`
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay.max(0.0))
    }

    /// Per-attempt timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Scope restrictions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RestrictionsConfig {
    /// Host suffixes the crawl may visit; empty means every host
    pub allowed_domains: Vec<String>,

    /// URL substrings that are never visited
    pub disallowed_paths: Vec<String>,
}
