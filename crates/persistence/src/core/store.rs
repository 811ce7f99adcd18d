//! Document store trait.
//!
//! This module defines the [`DocumentStore`] trait, the surface the collection
//! clients consume from a remote document store. Implementations translate
//! each call into the store's wire protocol and report failures as
//! [`StoreError`] without further interpretation; revision checks are the
//! store's job, not the client's.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::types::{Document, Selector};

/// An opaque reference to one named collection inside the store.
///
/// Handles are produced by [`DocumentStore::use_collection`] once the
/// collection is known to exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionHandle {
    name: String,
}

impl CollectionHandle {
    /// Binds a handle to a collection name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// Identifier of the written document.
    pub id: String,
    /// Revision produced by the write.
    #[serde(rename = "rev")]
    pub revision: String,
}

/// Collection metadata as reported by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub db_name: String,
    /// Number of live documents.
    #[serde(default)]
    pub doc_count: u64,
    /// Number of deleted documents.
    #[serde(default)]
    pub doc_del_count: u64,
    /// Any further fields the store reports (sizes, sequence numbers, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Operations a document store must provide.
///
/// All asynchronous calls are single request/response exchanges. Nothing in
/// this layer retries them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a human-readable name for this store implementation.
    fn backend_name(&self) -> &'static str;

    /// Authenticates with the configured account credentials.
    async fn authenticate(&self) -> Result<(), StoreError>;

    /// Lists the names of all collections.
    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;

    /// Creates a collection.
    ///
    /// Fails with [`StoreError::PreconditionFailed`] if it already exists.
    async fn create_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Returns a handle bound to a collection name.
    fn use_collection(&self, name: &str) -> CollectionHandle {
        CollectionHandle::new(name)
    }

    /// Returns every document matching the selector.
    async fn find(
        &self,
        handle: &CollectionHandle,
        selector: &Selector,
    ) -> Result<Vec<Document>, StoreError>;

    /// Inserts a document.
    ///
    /// A document whose `_id` already exists replaces it only when its `_rev`
    /// matches the current revision; otherwise the store answers
    /// [`StoreError::Conflict`]. A document without `_id` gets one assigned by
    /// the store.
    async fn insert(
        &self,
        handle: &CollectionHandle,
        document: Document,
    ) -> Result<WriteReceipt, StoreError>;

    /// Fetches a document by identifier.
    async fn get(&self, handle: &CollectionHandle, id: &str) -> Result<Document, StoreError>;

    /// Deletes a document at the given revision.
    async fn destroy(
        &self,
        handle: &CollectionHandle,
        id: &str,
        revision: &str,
    ) -> Result<WriteReceipt, StoreError>;

    /// Returns metadata about a collection.
    async fn collection_info(&self, name: &str) -> Result<CollectionInfo, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_receipt_from_store_body() {
        let receipt: WriteReceipt =
            serde_json::from_value(json!({"ok": true, "id": "d1", "rev": "1-abc"})).unwrap();

        assert_eq!(receipt.id, "d1");
        assert_eq!(receipt.revision, "1-abc");
    }

    #[test]
    fn test_collection_info_keeps_extra_fields() {
        let info: CollectionInfo = serde_json::from_value(json!({
            "db_name": "blaster_db",
            "doc_count": 3,
            "doc_del_count": 1,
            "update_seq": "7-g1AAAA",
            "sizes": {"file": 1024}
        }))
        .unwrap();

        assert_eq!(info.db_name, "blaster_db");
        assert_eq!(info.doc_count, 3);
        assert_eq!(info.doc_del_count, 1);
        assert_eq!(info.extra["sizes"]["file"], 1024);
    }

    #[test]
    fn test_handle_display() {
        let handle = CollectionHandle::new("blockchain_db");
        assert_eq!(handle.to_string(), "blockchain_db");
        assert_eq!(handle.name(), "blockchain_db");
    }
}
