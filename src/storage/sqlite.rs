//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::FetchStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::CrawlRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RECORD_COLUMNS: &str =
    "url, raw_content, title, fetch_time, content_fingerprint, next_fetch, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<CrawlRecord> {
        let status: String = row.get(6)?;
        Ok(CrawlRecord {
            url: row.get(0)?,
            raw_content: row.get(1)?,
            title: row.get(2)?,
            fetch_time: row.get(3)?,
            content_fingerprint: row.get(4)?,
            next_fetch: row.get(5)?,
            status: FetchStatus::from_db_string(&status).unwrap_or(FetchStatus::FailedFetch),
        })
    }
}

impl Storage for SqliteStorage {
    // ===== Record Access =====

    fn find(&self, url: &str) -> StorageResult<Option<CrawlRecord>> {
        let record = self
            .conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE url = ?1", RECORD_COLUMNS),
                params![url],
                Self::record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn upsert(&mut self, record: &CrawlRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO documents (url, raw_content, title, fetch_time, content_fingerprint, next_fetch, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(url) DO UPDATE SET
                raw_content = excluded.raw_content,
                title = excluded.title,
                fetch_time = excluded.fetch_time,
                content_fingerprint = excluded.content_fingerprint,
                next_fetch = excluded.next_fetch,
                status = excluded.status",
            params![
                record.url,
                record.raw_content,
                record.title,
                record.fetch_time,
                record.content_fingerprint,
                record.next_fetch,
                record.status.to_db_string(),
            ],
        )?;
        Ok(())
    }

    fn touch(&mut self, url: &str, fetch_time: i64, next_fetch: i64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE documents SET fetch_time = ?1, next_fetch = ?2 WHERE url = ?3",
            params![fetch_time, next_fetch, url],
        )?;
        if updated == 0 {
            return Err(StorageError::RecordNotFound(url.to_string()));
        }
        Ok(())
    }

    fn reschedule(
        &mut self,
        url: &str,
        next_fetch: i64,
        status: Option<FetchStatus>,
    ) -> StorageResult<()> {
        let updated = match status {
            Some(status) => self.conn.execute(
                "UPDATE documents SET next_fetch = ?1, status = ?2 WHERE url = ?3",
                params![next_fetch, status.to_db_string(), url],
            )?,
            None => self.conn.execute(
                "UPDATE documents SET next_fetch = ?1 WHERE url = ?2",
                params![next_fetch, url],
            )?,
        };
        if updated == 0 {
            return Err(StorageError::RecordNotFound(url.to_string()));
        }
        Ok(())
    }

    // ===== Scheduling =====

    fn find_due(&self, before: i64) -> StorageResult<Option<CrawlRecord>> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM documents WHERE next_fetch < ?1 ORDER BY next_fetch ASC, id ASC LIMIT 1",
                    RECORD_COLUMNS
                ),
                params![before],
                Self::record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    // ===== Statistics =====

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_fetched_since(&self, since: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE fetch_time >= ?1",
            params![since],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn top_url_prefixes(
        &self,
        prefix_len: usize,
        limit: usize,
    ) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT substr(url, 1, ?1) AS prefix, COUNT(*) AS hits
             FROM documents
             GROUP BY prefix
             ORDER BY hits DESC, prefix ASC
             LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![prefix_len as i64, limit as i64], |row| {
                let prefix: String = row.get(0)?;
                let hits: i64 = row.get(1)?;
                Ok((prefix, hits as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
