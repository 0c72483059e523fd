//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FetchStatus`: outcome tag persisted with every crawl record
//! - `CrawlState`: lifecycle of the crawl loop (running, stopping, stopped)
//! - `StopReason`: why a run ended

mod crawl_state;
mod fetch_status;

// Re-export main types
pub use crawl_state::{CrawlState, StopReason};
pub use fetch_status::FetchStatus;
