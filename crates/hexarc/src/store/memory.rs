//! In-memory document store, mainly for tests and demos.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::store::{Document, DocumentId, DocumentStore, Filter};

/// A [`DocumentStore`] holding everything in process memory.
///
/// Documents are kept in insertion order. Nothing survives a restart, which
/// makes this adapter the natural choice for unit tests and for services
/// that only need scratch state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_documents(&self) -> RwLockReadGuard<'_, Vec<Document>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_documents(&self) -> RwLockWriteGuard<'_, Vec<Document>> {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, document: &Document) -> Result<()> {
        let mut documents = self.write_documents();
        if documents.iter().any(|existing| existing.id == document.id) {
            return Err(Error::DocumentExists {
                id: document.id.to_string(),
            });
        }
        documents.push(document.clone());
        Ok(())
    }

    async fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
        let documents = self.read_documents();
        Ok(documents.iter().find(|doc| doc.id == *id).cloned())
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let documents = self.read_documents();
        Ok(documents
            .iter()
            .filter(|doc| filter.matches(&doc.body))
            .cloned()
            .collect())
    }

    async fn replace(&self, document: &Document) -> Result<()> {
        let mut documents = self.write_documents();
        match documents.iter_mut().find(|doc| doc.id == document.id) {
            Some(existing) => {
                existing.body = document.body.clone();
                Ok(())
            }
            None => Err(Error::DocumentNotFound {
                id: document.id.to_string(),
            }),
        }
    }

    async fn delete(&self, id: &DocumentId) -> Result<bool> {
        let mut documents = self.write_documents();
        let before = documents.len();
        documents.retain(|doc| doc.id != *id);
        Ok(documents.len() < before)
    }

    async fn count(&self) -> Result<u64> {
        let documents = self.read_documents();
        Ok(u64::try_from(documents.len()).unwrap_or(0))
    }

    async fn clear(&self) -> Result<()> {
        self.write_documents().clear();
        Ok(())
    }
}
