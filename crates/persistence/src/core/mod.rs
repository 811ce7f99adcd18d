//! Core storage traits and abstractions.
//!
//! - [`DocumentStore`] - The operations consumed from a remote document store
//! - [`CollectionHandle`] - Opaque reference to one named collection
//!
//! # Example: Implementing a Store
//!
//! ```ignore
//! use async_trait::async_trait;
//! use blaster_persistence::core::{CollectionHandle, DocumentStore, WriteReceipt};
//! use blaster_persistence::error::StoreError;
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait]
//! impl DocumentStore for MyStore {
//!     fn backend_name(&self) -> &'static str {
//!         "my-store"
//!     }
//!
//!     async fn get(&self, handle: &CollectionHandle, id: &str) -> Result<Document, StoreError> {
//!         // ...
//!     }
//!
//!     // ... other methods
//! }
//! ```

mod store;

pub use store::{CollectionHandle, CollectionInfo, DocumentStore, WriteReceipt};
