//! Blaster Persistence Layer
//!
//! This crate provides the document store clients for the Blaster donor and
//! ledger collections. It bootstraps each collection once, runs field-equality
//! queries and performs revision-checked upserts against a CouchDB-compatible
//! store.
//!
//! # Features
//!
//! - **Connection bootstrap**: authenticate, create the collection if absent,
//!   publish readiness
//! - **Queries**: equality selectors, results returned as a JSON-encoded array
//! - **Optimistic concurrency**: every write carries the revision it was read at
//! - **Fetch-and-merge updates**: typed patches applied onto the stored record
//!
//! # Backend Features
//!
//! - `cloudant` (default) - IBM Cloudant over HTTP with IAM API-key
//!   authentication
//!
//! The in-memory backend is always available.
//!
//! # Architecture
//!
//! - [`types`] - Documents, selectors and the result envelope
//! - [`error`] - Error types for all operations
//! - [`core`] - The [`DocumentStore`] trait
//! - [`backends`] - Store implementations
//! - [`collection`] - The generic collection client and its bootstrap
//! - [`schemas`] - Donor and ledger records
//! - [`clients`] - Both clients over one store
//! - [`config`] - Environment configuration
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use blaster_persistence::backends::memory::MemoryStore;
//! use blaster_persistence::schemas::{DonorClient, DonorRecord};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let donors = DonorClient::with_default_name(Arc::new(MemoryStore::new()));
//! donors.bootstrap().await?;
//!
//! let created = donors
//!     .create(DonorRecord {
//!         donor_id: Some("x".to_string()),
//!         blood_group: Some("O+".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! assert_eq!(created.status_code, 201);
//!
//! let found = donors.find(Some("x")).await?;
//! let records: Vec<DonorRecord> = found.decode()?;
//! assert_eq!(records.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod clients;
pub mod collection;
pub mod config;
pub mod core;
pub mod error;
pub mod schemas;
pub mod types;

// Re-export commonly used types at crate root
pub use clients::BlasterClients;
pub use collection::{Connection, DocumentCollection};
pub use config::StoreConfig;
pub use crate::core::{CollectionHandle, CollectionInfo, DocumentStore, WriteReceipt};
pub use error::{StorageError, StorageResult};
pub use schemas::{DonorClient, LedgerClient};
pub use types::{Document, ResultEnvelope, Selector};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Installs a global `tracing` subscriber filtered by `directives`, for
/// example `blaster_persistence=debug`.
///
/// `RUST_LOG`, when set, takes precedence. Fails if a global subscriber is
/// already installed. [`StoreConfig::init_logging`] builds the directives
/// from `BLASTER_LOG_LEVEL`.
pub fn init_logging(directives: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
}
