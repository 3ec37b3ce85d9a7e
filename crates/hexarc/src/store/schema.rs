//! `SQLite` schema definitions for the document store.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the documents table.
///
/// `seq` keeps insertion order; `id` is the external document identifier.
pub const CREATE_DOCUMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    body TEXT NOT NULL,
    inserted_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on `id` for point lookups.
pub const CREATE_ID_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_documents_id ON documents(id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_DOCUMENTS_TABLE,
    CREATE_ID_INDEX,
    CREATE_METADATA_TABLE,
];
