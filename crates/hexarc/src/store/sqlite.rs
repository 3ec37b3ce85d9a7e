//! `SQLite`-backed document store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::store::{migrations, Document, DocumentId, DocumentStore, Filter};

/// A [`DocumentStore`] persisting documents in a `SQLite` database.
///
/// Bodies are stored as JSON text and insertion order is preserved through
/// a monotonic sequence column. Filters are evaluated in process over the
/// decoded bodies, so all filter operators behave exactly as they do for
/// [`MemoryStore`](crate::store::MemoryStore).
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a document database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // Enable WAL mode for better concurrent read performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        // Initialize schema
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().await;

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;

        let oldest: Option<String> = conn
            .query_row(
                "SELECT inserted_at FROM documents ORDER BY seq ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let newest: Option<String> = conn
            .query_row(
                "SELECT inserted_at FROM documents ORDER BY seq DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let oldest_document = oldest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let newest_document = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        // Get database file size
        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            total_documents: u64::try_from(total).unwrap_or(0),
            oldest_document,
            newest_document,
            db_size_bytes,
        })
    }

    /// Convert a stored row back into a [`Document`].
    fn parse_row(id: &str, body: &str) -> Result<Document> {
        let id: DocumentId = id
            .parse()
            .map_err(|_| Error::internal(format!("invalid document id in database: {id}")))?;
        let body: Value = serde_json::from_str(body)?;
        Ok(Document::with_id(id, body))
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, document: &Document) -> Result<()> {
        let conn = self.conn.lock().await;

        let id = document.id.to_string();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE id = ?1",
            [&id],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(Error::DocumentExists { id });
        }

        let body = serde_json::to_string(&document.body)?;
        let inserted_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO documents (id, body, inserted_at) VALUES (?1, ?2, ?3)",
            params![id, body, inserted_at],
        )?;

        debug!("Inserted document {}", document.id);
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
        let conn = self.conn.lock().await;

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT id, body FROM documents WHERE id = ?1",
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((id, body)) => Ok(Some(Self::parse_row(&id, &body)?)),
            None => Ok(None),
        }
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT id, body FROM documents ORDER BY seq ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut documents = Vec::new();
        for (id, body) in rows {
            let document = Self::parse_row(&id, &body)?;
            if filter.matches(&document.body) {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    async fn replace(&self, document: &Document) -> Result<()> {
        let conn = self.conn.lock().await;

        let body = serde_json::to_string(&document.body)?;
        let affected = conn.execute(
            "UPDATE documents SET body = ?2 WHERE id = ?1",
            params![document.id.to_string(), body],
        )?;

        if affected == 0 {
            return Err(Error::DocumentNotFound {
                id: document.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> Result<bool> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM documents WHERE id = ?1", [id.to_string()])?;
        Ok(affected > 0)
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM documents", [])?;
        Ok(())
    }
}

/// Statistics about a `SQLite` document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of documents stored.
    pub total_documents: u64,
    /// Insertion time of the oldest document.
    pub oldest_document: Option<DateTime<Utc>>,
    /// Insertion time of the newest document.
    pub newest_document: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
