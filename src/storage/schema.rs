//! Database schema definitions
//!
//! This module contains the SQL schema for the crawler's document store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per canonical URL
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    raw_content TEXT NOT NULL,
    title TEXT NOT NULL,
    fetch_time INTEGER NOT NULL,
    content_fingerprint TEXT NOT NULL,
    next_fetch INTEGER NOT NULL,
    status TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_url ON documents(url);
CREATE INDEX IF NOT EXISTS idx_documents_next_fetch ON documents(next_fetch);
CREATE INDEX IF NOT EXISTS idx_documents_fetch_time ON documents(fetch_time);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
