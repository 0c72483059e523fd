//! Storage traits and error types
//!
//! This module defines the trait interface for document store backends and
//! associated error types.

use crate::state::FetchStatus;
use crate::storage::CrawlRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Access pattern the crawler requires from its document store
///
/// Records are keyed by canonical URL; a backend must never hold two records
/// with the same `url`. Indexes on `url` and `next_fetch` are expected for
/// performance but not required for correctness.
pub trait Storage {
    // ===== Record Access =====

    /// Looks up the record for a canonical URL
    fn find(&self, url: &str) -> StorageResult<Option<CrawlRecord>>;

    /// Inserts a record, or replaces every field of the existing one with the same URL
    fn upsert(&mut self, record: &CrawlRecord) -> StorageResult<()>;

    /// Records a fetch whose content did not change
    ///
    /// Only `fetch_time` and `next_fetch` are written.
    fn touch(&mut self, url: &str, fetch_time: i64, next_fetch: i64) -> StorageResult<()>;

    /// Moves `next_fetch` without recording a fetch
    ///
    /// When `status` is given it replaces the stored status; content, title,
    /// fingerprint and `fetch_time` are left alone.
    fn reschedule(
        &mut self,
        url: &str,
        next_fetch: i64,
        status: Option<FetchStatus>,
    ) -> StorageResult<()>;

    // ===== Scheduling =====

    /// Returns the record with the smallest `next_fetch` strictly before `before`
    ///
    /// Order among equal `next_fetch` values is backend-defined.
    fn find_due(&self, before: i64) -> StorageResult<Option<CrawlRecord>>;

    // ===== Statistics =====

    /// Gets total record count
    fn count(&self) -> StorageResult<u64>;

    /// Counts records whose `fetch_time` is at or after `since`
    fn count_fetched_since(&self, since: i64) -> StorageResult<u64>;

    /// Groups records by the first `prefix_len` characters of their URL
    ///
    /// Returns the `limit` largest groups, largest first.
    fn top_url_prefixes(&self, prefix_len: usize, limit: usize)
        -> StorageResult<Vec<(String, u64)>>;
}
