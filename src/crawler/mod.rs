//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML parsing and link extraction
//! - Content change detection
//! - The frontier and revisit policy
//! - Overall crawl coordination

mod change;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod retry;
mod shutdown;

pub use change::{changed, fingerprint};
pub use coordinator::{now_epoch, run_crawl, Coordinator, RunReport, RunStats, VisitOutcome};
pub use fetcher::{
    build_http_client, is_html_content_type, HttpClient, HttpResponse, ReqwestClient,
    TransportError,
};
pub use frontier::{Frontier, FrontierEntry, PendingQueue, RevisitPolicy};
pub use parser::{extract_links, extract_title, parse_html, ParsedPage};
pub use retry::{FetchOutcome, FetchRetrier, FetchedPage, DEFAULT_BACKOFF_UNIT};
pub use shutdown::spawn_shutdown_listener;
