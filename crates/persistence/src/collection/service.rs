//! The collection component: queries, upserts and deletes over one
//! bootstrapped collection.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use super::connection::Connection;
use super::record::{BloodGroupSearch, CollectionRecord, DeletableRecord};
use crate::core::{CollectionHandle, CollectionInfo, DocumentStore};
use crate::error::{StorageResult, StoreError, ValidationError};
use crate::types::{Created, Document, ID_FIELD, ResultEnvelope, STATUS_OK, Selector, Updated};

/// Outcome of the fetch that precedes a merge update or a delete.
enum Fetched {
    Found(Document),
    /// The store answered with this status instead of the document.
    Missing(u16),
}

/// Client for one collection of `R` records.
///
/// Every operation except [`info`](Self::info) needs the connection handle and
/// fails with [`ConnectionError::NotReady`](crate::error::ConnectionError::NotReady)
/// until bootstrap completes.
///
/// Results follow a two-channel contract. Store errors are returned unchanged
/// as `Err`. Fetch-before-write operations whose fetch is answered with a
/// status (for example 404) resolve `Ok` with that status and no data, so
/// callers must check [`ResultEnvelope::is_success`] as well.
pub struct DocumentCollection<R: CollectionRecord> {
    store: Arc<dyn DocumentStore>,
    connection: Connection,
    _record: PhantomData<fn() -> R>,
}

impl<R: CollectionRecord> fmt::Debug for DocumentCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentCollection")
            .field("collection", &self.connection.collection())
            .field("backend", &self.store.backend_name())
            .field("ready", &self.connection.is_ready())
            .finish()
    }
}

impl<R: CollectionRecord> DocumentCollection<R> {
    /// Creates a client for the named collection. Nothing is contacted until
    /// [`bootstrap`](Self::bootstrap).
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            connection: Connection::new(Arc::clone(&store), collection),
            store,
            _record: PhantomData,
        }
    }

    /// Creates a client for the record type's default collection.
    pub fn with_default_name(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, R::DEFAULT_COLLECTION)
    }

    /// Creates a client and starts its bootstrap in the background.
    ///
    /// Must be called from within a tokio runtime. A bootstrap failure is
    /// logged and then reported by [`ready`](Self::ready) and by every
    /// operation.
    pub fn open(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Arc<Self> {
        let client = Arc::new(Self::new(store, collection));
        let bootstrap = Arc::clone(&client);
        tokio::spawn(async move {
            if let Err(err) = bootstrap.bootstrap().await {
                warn!(
                    collection = %bootstrap.name(),
                    error = %err,
                    "Collection client is unusable"
                );
            }
        });
        client
    }

    /// Returns the collection name.
    pub fn name(&self) -> &str {
        self.connection.collection()
    }

    /// Runs the connection bootstrap. See [`Connection::connect`].
    pub async fn bootstrap(&self) -> StorageResult<CollectionHandle> {
        self.connection.connect().await
    }

    /// Waits until bootstrap has finished.
    pub async fn ready(&self) -> StorageResult<CollectionHandle> {
        self.connection.ready().await
    }

    /// Returns `true` once the collection handle is available.
    pub fn is_ready(&self) -> bool {
        self.connection.is_ready()
    }

    /// Returns every document matching an equality selector.
    ///
    /// `data` holds the matches as a JSON-encoded array, `"[]"` when nothing
    /// matches.
    pub async fn find_by(&self, selector: &Selector) -> StorageResult<ResultEnvelope<String>> {
        let handle = self.connection.handle()?;
        debug!(collection = %handle, selector = ?selector, "Running query");

        let documents = self.store.find(&handle, selector).await.inspect_err(|err| {
            error!(collection = %handle, error = %err, "Query failed");
        })?;

        debug!(collection = %handle, count = documents.len(), "Query returned");
        Ok(ResultEnvelope::ok(serde_json::to_string(&documents)?))
    }

    /// Looks records up by their lookup field. `None` returns the whole
    /// collection.
    pub async fn find(&self, key: Option<&str>) -> StorageResult<ResultEnvelope<String>> {
        self.find_by(&R::lookup_selector(key)).await
    }

    /// Inserts a new record, assigning a UUID when it has no identifier.
    pub async fn create(&self, mut record: R) -> StorageResult<ResultEnvelope<Created>> {
        let handle = self.connection.handle()?;

        if record.id().is_none_or(str::is_empty) {
            record.set_id(Uuid::new_v4().to_string());
        }

        let document = Document::from_record(&record)?;
        let receipt = self.store.insert(&handle, document).await.inspect_err(|err| {
            error!(collection = %handle, id = ?record.id(), error = %err, "Create failed");
        })?;

        debug!(collection = %handle, id = %receipt.id, rev = %receipt.revision, "Created document");
        Ok(ResultEnvelope::created(Created {
            id: receipt.id,
            revision: receipt.revision,
        }))
    }

    /// Submits the record as a full replacement.
    ///
    /// The record must carry its identifier and the revision it was read at;
    /// a stale revision is rejected by the store with
    /// [`StoreError::Conflict`].
    pub async fn update(&self, record: R) -> StorageResult<ResultEnvelope<Updated>> {
        let handle = self.connection.handle()?;
        let id = required_id(record.id())?.to_string();

        let document = Document::from_record(&record)?;
        let receipt = self.store.insert(&handle, document).await.inspect_err(|err| {
            error!(collection = %handle, id = %id, error = %err, "Update failed");
        })?;

        debug!(collection = %handle, id = %id, rev = %receipt.revision, "Updated document");
        Ok(ResultEnvelope::ok(Updated {
            revision: receipt.revision,
        }))
    }

    /// Fetches the document, merges the patch onto it and submits the result
    /// at the fetched revision.
    ///
    /// The merge works on the stored JSON, so fields the patch does not name
    /// keep their stored values and types. Patch fields that are absent or
    /// empty are ignored. If the fetch is answered with a status, the envelope
    /// carries that status and no data.
    pub async fn update_fields(
        &self,
        id: &str,
        patch: R::Patch,
    ) -> StorageResult<ResultEnvelope<Updated>> {
        let handle = self.connection.handle()?;
        let id = required_id(Some(id))?;

        let mut document = match self.fetch(&handle, id).await? {
            Fetched::Found(document) => document,
            Fetched::Missing(status) => return Ok(ResultEnvelope::status_only(status)),
        };
        R::apply_patch(&mut document.fields, patch);

        let revision = document.revision.clone();
        let receipt = self.store.insert(&handle, document).await.inspect_err(|err| {
            error!(collection = %handle, id = %id, rev = ?revision, error = %err, "Update failed");
        })?;

        debug!(collection = %handle, id = %id, rev = %receipt.revision, "Merged update");
        Ok(ResultEnvelope::ok(Updated {
            revision: receipt.revision,
        }))
    }

    /// Returns the store's metadata for this collection.
    pub async fn info(&self) -> StorageResult<CollectionInfo> {
        let info = self.store.collection_info(self.name()).await?;
        debug!(
            collection = %info.db_name,
            doc_count = info.doc_count,
            doc_del_count = info.doc_del_count,
            "Collection info"
        );
        Ok(info)
    }

    async fn fetch(&self, handle: &CollectionHandle, id: &str) -> StorageResult<Fetched> {
        match self.store.get(handle, id).await {
            Ok(document) => Ok(Fetched::Found(document)),
            Err(err) => match err.status_code() {
                Some(status) => {
                    warn!(collection = %handle, id = %id, status, error = %err, "Fetch failed");
                    Ok(Fetched::Missing(status))
                }
                None => {
                    error!(collection = %handle, id = %id, error = %err, "Fetch failed");
                    Err(err.into())
                }
            },
        }
    }
}

impl<R: DeletableRecord> DocumentCollection<R> {
    /// Deletes a document at its current revision.
    ///
    /// Resolves with 200 on success, or with the store's status when the
    /// document could not be fetched.
    pub async fn delete_by_id(&self, id: &str) -> StorageResult<u16> {
        let handle = self.connection.handle()?;
        let id = required_id(Some(id))?;

        let document = match self.fetch(&handle, id).await? {
            Fetched::Found(document) => document,
            Fetched::Missing(status) => return Ok(status),
        };
        let revision = document.revision.ok_or_else(|| StoreError::InvalidResponse {
            message: format!("document '{}' has no revision", id),
        })?;

        self.store
            .destroy(&handle, id, &revision)
            .await
            .inspect_err(|err| {
                error!(collection = %handle, id = %id, rev = %revision, error = %err, "Delete failed");
            })?;

        debug!(collection = %handle, id = %id, "Deleted document");
        Ok(STATUS_OK)
    }
}

impl<R: BloodGroupSearch> DocumentCollection<R> {
    /// Searches by blood group. `None` leaves the blood group unconstrained.
    pub async fn find_blood(
        &self,
        blood_group: Option<&str>,
    ) -> StorageResult<ResultEnvelope<String>> {
        self.find_by(&R::blood_group_selector(blood_group)).await
    }
}

fn required_id(id: Option<&str>) -> Result<&str, ValidationError> {
    id.filter(|id| !id.is_empty())
        .ok_or_else(|| ValidationError::MissingRequiredField {
            field: ID_FIELD.to_string(),
        })
}
