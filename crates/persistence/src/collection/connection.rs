//! Collection connection bootstrap.
//!
//! A [`Connection`] establishes the handle to one named collection exactly
//! once: authenticate, list collections, create the target if it is absent,
//! then bind a handle. The outcome is published on a watch channel so callers
//! can either wait for it ([`Connection::ready`]) or check it without blocking
//! ([`Connection::handle`]).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::core::{CollectionHandle, DocumentStore};
use crate::error::{ConnectionError, StorageResult, StoreError};

#[derive(Debug, Clone)]
enum ConnectionState {
    Pending,
    Ready(CollectionHandle),
    Failed(StoreError),
}

/// Lifecycle of the handle to one collection.
pub struct Connection {
    store: Arc<dyn DocumentStore>,
    collection: String,
    state: watch::Sender<ConnectionState>,
    started: AtomicBool,
}

impl Connection {
    /// Creates an unconnected connection to the named collection.
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Pending);
        Self {
            store,
            collection: collection.into(),
            state,
            started: AtomicBool::new(false),
        }
    }

    /// Returns the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Establishes the collection handle.
    ///
    /// May be called once; later calls fail with
    /// [`ConnectionError::AlreadyStarted`]. A failure is final and is reported
    /// to every later caller of [`ready`](Self::ready) and
    /// [`handle`](Self::handle).
    pub async fn connect(&self) -> StorageResult<CollectionHandle> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ConnectionError::AlreadyStarted {
                collection: self.collection.clone(),
            }
            .into());
        }

        info!(
            collection = %self.collection,
            backend = self.store.backend_name(),
            "Initializing store connection"
        );

        match self.establish().await {
            Ok(handle) => {
                info!(collection = %self.collection, "Connected to collection");
                self.state.send_replace(ConnectionState::Ready(handle.clone()));
                Ok(handle)
            }
            Err(err) => {
                error!(
                    collection = %self.collection,
                    error = %err,
                    "Error while initializing store connection"
                );
                self.state.send_replace(ConnectionState::Failed(err.clone()));
                Err(ConnectionError::BootstrapFailed {
                    collection: self.collection.clone(),
                    source: err,
                }
                .into())
            }
        }
    }

    async fn establish(&self) -> Result<CollectionHandle, StoreError> {
        self.store.authenticate().await?;

        let existing = self.store.list_collections().await?;
        if !existing.iter().any(|name| *name == self.collection) {
            info!(collection = %self.collection, "Collection does not exist, creating");
            match self.store.create_collection(&self.collection).await {
                Ok(()) => {}
                Err(StoreError::PreconditionFailed { reason }) => {
                    debug!(
                        collection = %self.collection,
                        reason = %reason,
                        "Collection was created concurrently"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(self.store.use_collection(&self.collection))
    }

    /// Waits for bootstrap to finish and returns its outcome.
    pub async fn ready(&self) -> StorageResult<CollectionHandle> {
        let mut receiver = self.state.subscribe();
        let state = receiver
            .wait_for(|state| !matches!(state, ConnectionState::Pending))
            .await
            .map(|state| state.clone())
            .map_err(|_| ConnectionError::NotReady {
                collection: self.collection.clone(),
            })?;
        self.resolve(&state)
    }

    /// Returns the handle without waiting.
    ///
    /// Fails with [`ConnectionError::NotReady`] while bootstrap is pending and
    /// with [`ConnectionError::BootstrapFailed`] after it failed.
    pub fn handle(&self) -> StorageResult<CollectionHandle> {
        let state = self.state.borrow().clone();
        self.resolve(&state)
    }

    /// Returns `true` once a handle is available.
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), ConnectionState::Ready(_))
    }

    fn resolve(&self, state: &ConnectionState) -> StorageResult<CollectionHandle> {
        match state {
            ConnectionState::Ready(handle) => Ok(handle.clone()),
            ConnectionState::Pending => Err(ConnectionError::NotReady {
                collection: self.collection.clone(),
            }
            .into()),
            ConnectionState::Failed(err) => Err(ConnectionError::BootstrapFailed {
                collection: self.collection.clone(),
                source: err.clone(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryStore;
    use crate::error::StorageError;

    #[tokio::test]
    async fn test_connect_creates_missing_collection() {
        let store = Arc::new(MemoryStore::new());
        let connection = Connection::new(store.clone(), "blaster_db");

        let handle = connection.connect().await.unwrap();

        assert_eq!(handle.name(), "blaster_db");
        assert!(store.is_authenticated());
        assert!(store.has_collection("blaster_db"));
        assert_eq!(store.create_collection_calls(), 1);
        assert!(connection.is_ready());
    }

    #[tokio::test]
    async fn test_connect_twice_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let connection = Connection::new(store.clone(), "blaster_db");

        connection.connect().await.unwrap();
        let err = connection.connect().await.unwrap_err();

        assert!(matches!(
            err,
            StorageError::Connection(ConnectionError::AlreadyStarted { .. })
        ));
        assert_eq!(store.create_collection_calls(), 1);
        assert!(connection.handle().is_ok());
    }

    #[tokio::test]
    async fn test_handle_before_connect_is_not_ready() {
        let connection = Connection::new(Arc::new(MemoryStore::new()), "blaster_db");

        let err = connection.handle().unwrap_err();
        assert!(matches!(
            err,
            StorageError::Connection(ConnectionError::NotReady { .. })
        ));
        assert!(!connection.is_ready());
    }

    #[tokio::test]
    async fn test_ready_waits_for_connect() {
        let connection = Arc::new(Connection::new(
            Arc::new(MemoryStore::new()),
            "blockchain_db",
        ));

        let waiter = {
            let connection = Arc::clone(&connection);
            tokio::spawn(async move { connection.ready().await })
        };
        connection.connect().await.unwrap();

        let handle = waiter.await.unwrap().unwrap();
        assert_eq!(handle.name(), "blockchain_db");
    }

    #[tokio::test]
    async fn test_failed_create_is_fatal() {
        let store = Arc::new(MemoryStore::new().fail_collection_creation());
        let connection = Connection::new(store, "blaster_db");

        assert!(connection.connect().await.is_err());

        match connection.ready().await.unwrap_err() {
            StorageError::Connection(ConnectionError::BootstrapFailed { source, .. }) => {
                assert_eq!(source.status_code(), Some(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(connection.handle().is_err());
    }
}
