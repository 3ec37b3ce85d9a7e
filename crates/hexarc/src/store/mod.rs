//! Document store layer for hexarc.
//!
//! A document store keeps schemaless JSON documents addressed by id and
//! queried with the [`Filter`] algebra. The store is a port: application
//! models depend on the [`DocumentStore`] trait, and deployments choose an
//! adapter, either the `SQLite`-backed [`SqliteStore`] or the in-memory
//! [`MemoryStore`].

pub mod filter;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sqlite;

pub use filter::Filter;
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, StoreStats};

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// Unique identifier of a stored document.
///
/// Internally a UUID v4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random document id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A schemaless document: an id plus a JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: DocumentId,
    /// The JSON body.
    pub body: Value,
}

impl Document {
    /// Create a document with a fresh random id.
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            id: DocumentId::new(),
            body,
        }
    }

    /// Create a document with an explicit id.
    #[must_use]
    pub fn with_id(id: DocumentId, body: Value) -> Self {
        Self { id, body }
    }

    /// Look up a field of the body by dot-separated path.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&Value> {
        filter::resolve(&self.body, path)
    }
}

/// Port trait for document persistence.
///
/// Implementations are safe to share behind an `Arc` and call from many
/// tasks at once.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentExists`](crate::Error::DocumentExists) if a
    /// document with the same id is already stored.
    async fn insert(&self, document: &Document) -> Result<()>;

    /// Fetch a document by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails; a missing document
    /// is `Ok(None)`.
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// Fetch all documents matching a filter, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn find(&self, filter: &Filter) -> Result<Vec<Document>>;

    /// Replace the body of an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`](crate::Error::DocumentNotFound)
    /// if no document with this id is stored.
    async fn replace(&self, document: &Document) -> Result<()>;

    /// Delete a document by id.
    ///
    /// Returns `true` if a document was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn delete(&self, id: &DocumentId) -> Result<bool>;

    /// Count stored documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn count(&self) -> Result<u64>;

    /// Delete every document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn clear(&self) -> Result<()>;
}
