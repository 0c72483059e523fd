//! Storage module for persisting crawl records
//!
//! The crawler talks to its document store only through the [`Storage`]
//! trait: one [`CrawlRecord`] per canonical URL, upserted by key, plus the
//! due-for-revisit query the frontier needs. [`SqliteStorage`] is the adapter
//! shipped with the crate.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::FetchStatus;
use std::path::Path;

/// Title stored when a page has no usable `<title>`
pub const UNTITLED: &str = "untitled";

/// Opens the document store named by the `db.path` setting
///
/// `:memory:` opens a throwaway in-memory store.
pub fn open_storage(target: &str) -> StorageResult<SqliteStorage> {
    if target == ":memory:" {
        SqliteStorage::new_in_memory()
    } else {
        SqliteStorage::new(Path::new(target))
    }
}

/// One stored document, keyed by canonical URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    /// Canonical URL (unique key)
    pub url: String,

    /// Last fetched payload
    pub raw_content: String,

    /// Extracted title, or [`UNTITLED`]
    pub title: String,

    /// Epoch seconds of the last successful fetch
    pub fetch_time: i64,

    /// Hex digest of `raw_content`
    pub content_fingerprint: String,

    /// Epoch seconds after which the record may be fetched again
    pub next_fetch: i64,

    /// Outcome of the last attempt
    pub status: FetchStatus,
}

impl CrawlRecord {
    /// Returns true if `next_fetch` lies strictly before `now`
    pub fn is_due(&self, now: i64) -> bool {
        self.next_fetch < now
    }
}
