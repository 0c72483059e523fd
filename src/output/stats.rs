//! Statistics generation from the document store
//!
//! This module provides functionality for extracting and displaying
//! store statistics through the storage layer.

use crate::storage::{Storage, StorageResult};
use chrono::{Local, TimeZone};

/// Number of leading URL characters grouped together in the prefix report
pub const PREFIX_LEN: usize = 50;

/// Number of prefixes listed in the report
pub const TOP_PREFIXES: usize = 5;

/// Document store statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of stored documents
    pub total_documents: u64,

    /// Documents fetched since local midnight
    pub fetched_today: u64,

    /// Most common URL prefixes with their document counts
    pub top_prefixes: Vec<(String, u64)>,
}

/// Epoch seconds of the most recent local midnight
pub fn start_of_today() -> i64 {
    let today = Local::now().date_naive();
    today
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .map(|midnight| midnight.timestamp())
        // midnight skipped by a DST change: fall back to 24 hours ago
        .unwrap_or_else(|| Local::now().timestamp() - 86_400)
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `since` - Epoch seconds counted as the start of "today"
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage, since: i64) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_documents: storage.count()?,
        fetched_today: storage.count_fetched_since(since)?,
        top_prefixes: storage.top_url_prefixes(PREFIX_LEN, TOP_PREFIXES)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Total documents: {}", stats.total_documents);
    println!("  Fetched today: {}", stats.fetched_today);
    println!();

    if !stats.top_prefixes.is_empty() {
        println!("Top URL Prefixes:");
        for (prefix, count) in &stats.top_prefixes {
            let percentage = if stats.total_documents > 0 {
                (*count as f64 / stats.total_documents as f64) * 100.0
            } else {
                0.0
            };
            println!("  {} ({} documents, {:.1}%)", prefix, count, percentage);
        }
        println!();
    }
}
