//! In-process document store.
//!
//! [`MemoryStore`] implements [`DocumentStore`] with the revision rules of a
//! CouchDB-compatible store: revisions look like `N-<hex>`, writes must carry
//! the current revision, and missing or deleted documents answer 404. It backs
//! the test suites and local development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::{CollectionHandle, CollectionInfo, DocumentStore, WriteReceipt};
use crate::error::StoreError;
use crate::types::{Document, Selector};

const BACKEND_NAME: &str = "memory";

#[derive(Debug, Clone)]
struct StoredDocument {
    generation: u64,
    document: Document,
}

#[derive(Debug, Default)]
struct CollectionState {
    documents: BTreeMap<String, StoredDocument>,
    // Generation of deleted documents, so a recreated id keeps counting.
    tombstones: BTreeMap<String, u64>,
    update_seq: u64,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, CollectionState>,
    authenticated: bool,
    create_collection_calls: usize,
    reject_credentials: bool,
    fail_collection_creation: bool,
    fail_reads: bool,
    conflict_on_delete: bool,
}

/// An in-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store with no collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds the named collections.
    pub fn with_collections(names: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock();
            for name in names {
                state
                    .collections
                    .insert((*name).to_string(), CollectionState::default());
            }
        }
        store
    }

    /// Makes every authentication attempt fail with a 401.
    pub fn reject_credentials(self) -> Self {
        self.state.lock().reject_credentials = true;
        self
    }

    /// Makes every create-collection call fail with a 500.
    pub fn fail_collection_creation(self) -> Self {
        self.state.lock().fail_collection_creation = true;
        self
    }

    /// Makes every document read fail as if the connection dropped. The
    /// error carries no status.
    pub fn fail_reads(self) -> Self {
        self.state.lock().fail_reads = true;
        self
    }

    /// Makes every delete fail with a 409, as if another writer got there
    /// first.
    pub fn conflict_on_delete(self) -> Self {
        self.state.lock().conflict_on_delete = true;
        self
    }

    /// Number of create-collection calls received so far.
    pub fn create_collection_calls(&self) -> usize {
        self.state.lock().create_collection_calls
    }

    /// Returns `true` once an authentication attempt has succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.state.lock().authenticated
    }

    /// Returns `true` if the collection exists.
    pub fn has_collection(&self, name: &str) -> bool {
        self.state.lock().collections.contains_key(name)
    }

    /// Number of live documents in a collection.
    pub fn document_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .collections
            .get(name)
            .map(|c| c.documents.len())
            .unwrap_or_default()
    }

    /// Returns the stored form of a document, bypassing the client layer.
    pub fn snapshot(&self, name: &str, id: &str) -> Option<Document> {
        self.state
            .lock()
            .collections
            .get(name)
            .and_then(|c| c.documents.get(id))
            .map(|stored| stored.document.clone())
    }
}

fn new_revision(generation: u64) -> String {
    format!("{}-{}", generation, Uuid::new_v4().simple())
}

fn missing_database() -> StoreError {
    StoreError::NotFound {
        reason: "Database does not exist.".to_string(),
    }
}

fn update_conflict() -> StoreError {
    StoreError::Conflict {
        reason: "Document update conflict.".to_string(),
    }
}

// Every call is an I/O boundary: yield first so concurrent requests interleave
// the way they do against a remote store.
async fn io_boundary() {
    tokio::task::yield_now().await;
}

impl MemoryState {
    fn collection(&self, name: &str) -> Result<&CollectionState, StoreError> {
        self.collections.get(name).ok_or_else(missing_database)
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut CollectionState, StoreError> {
        self.collections.get_mut(name).ok_or_else(missing_database)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn authenticate(&self) -> Result<(), StoreError> {
        io_boundary().await;
        let mut state = self.state.lock();
        if state.reject_credentials {
            return Err(StoreError::Unauthorized {
                status: 401,
                reason: "Provided API key could not be found.".to_string(),
            });
        }
        state.authenticated = true;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        io_boundary().await;
        Ok(self.state.lock().collections.keys().cloned().collect())
    }

    async fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        io_boundary().await;
        let mut state = self.state.lock();
        state.create_collection_calls += 1;
        if state.fail_collection_creation {
            return Err(StoreError::Status {
                status: 500,
                error: "internal_server_error".to_string(),
                reason: "forced create failure".to_string(),
            });
        }
        if state.collections.contains_key(name) {
            return Err(StoreError::PreconditionFailed {
                reason: "The database could not be created, the file already exists."
                    .to_string(),
            });
        }
        state
            .collections
            .insert(name.to_string(), CollectionState::default());
        Ok(())
    }

    async fn find(
        &self,
        handle: &CollectionHandle,
        selector: &Selector,
    ) -> Result<Vec<Document>, StoreError> {
        io_boundary().await;
        let state = self.state.lock();
        let collection = state.collection(handle.name())?;
        Ok(collection
            .documents
            .values()
            .filter(|stored| selector.matches(&stored.document))
            .map(|stored| stored.document.clone())
            .collect())
    }

    async fn insert(
        &self,
        handle: &CollectionHandle,
        mut document: Document,
    ) -> Result<WriteReceipt, StoreError> {
        io_boundary().await;
        let mut state = self.state.lock();
        let collection = state.collection_mut(handle.name())?;

        let id = document
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        let generation = match collection.documents.get(&id) {
            Some(current) => {
                if document.revision.as_deref() != current.document.revision.as_deref() {
                    return Err(update_conflict());
                }
                current.generation + 1
            }
            None => {
                if document.revision.is_some() {
                    return Err(update_conflict());
                }
                collection.tombstones.get(&id).copied().unwrap_or_default() + 1
            }
        };

        let revision = new_revision(generation);
        document.id = Some(id.clone());
        document.revision = Some(revision.clone());

        collection.tombstones.remove(&id);
        collection.documents.insert(
            id.clone(),
            StoredDocument {
                generation,
                document,
            },
        );
        collection.update_seq += 1;

        Ok(WriteReceipt { id, revision })
    }

    async fn get(&self, handle: &CollectionHandle, id: &str) -> Result<Document, StoreError> {
        io_boundary().await;
        let state = self.state.lock();
        if state.fail_reads {
            return Err(StoreError::Unavailable {
                message: "connection reset by peer".to_string(),
            });
        }
        let collection = state.collection(handle.name())?;
        match collection.documents.get(id) {
            Some(stored) => Ok(stored.document.clone()),
            None => Err(StoreError::NotFound {
                reason: if collection.tombstones.contains_key(id) {
                    "deleted".to_string()
                } else {
                    "missing".to_string()
                },
            }),
        }
    }

    async fn destroy(
        &self,
        handle: &CollectionHandle,
        id: &str,
        revision: &str,
    ) -> Result<WriteReceipt, StoreError> {
        io_boundary().await;
        let mut state = self.state.lock();
        if state.conflict_on_delete {
            return Err(update_conflict());
        }
        let collection = state.collection_mut(handle.name())?;

        let Some(current) = collection.documents.get(id) else {
            return Err(StoreError::NotFound {
                reason: "missing".to_string(),
            });
        };
        if current.document.revision.as_deref() != Some(revision) {
            return Err(update_conflict());
        }

        let generation = current.generation + 1;
        collection.documents.remove(id);
        collection.tombstones.insert(id.to_string(), generation);
        collection.update_seq += 1;

        Ok(WriteReceipt {
            id: id.to_string(),
            revision: new_revision(generation),
        })
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, StoreError> {
        io_boundary().await;
        let state = self.state.lock();
        let collection = state.collection(name)?;

        let mut extra = Map::new();
        extra.insert(
            "update_seq".to_string(),
            Value::String(collection.update_seq.to_string()),
        );

        Ok(CollectionInfo {
            db_name: name.to_string(),
            doc_count: collection.documents.len() as u64,
            doc_del_count: collection.tombstones.len() as u64,
            extra,
        })
    }
}
