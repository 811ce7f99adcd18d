//! Collection clients.
//!
//! [`DocumentCollection`] is one reusable component parameterized by a record
//! type. It owns a [`Connection`] that is bootstrapped once and then serves
//! queries, creates, updates and (for [`DeletableRecord`] types) deletes.
//!
//! # Update protocol
//!
//! Every write carries the revision the caller last read. The store accepts
//! the write only when that revision is still current, so of two updates
//! racing from the same revision exactly one succeeds and the other fails with
//! [`StoreError::Conflict`](crate::error::StoreError::Conflict).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use blaster_persistence::backends::memory::MemoryStore;
//! use blaster_persistence::schemas::{DonorClient, DonorPatch, DonorRecord};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let donors = DonorClient::with_default_name(Arc::new(MemoryStore::new()));
//! donors.bootstrap().await?;
//!
//! let created = donors
//!     .create(DonorRecord {
//!         donor_id: Some("x".to_string()),
//!         quantity: Some("5".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let id = created.into_data().map(|c| c.id).unwrap_or_default();
//! donors
//!     .update_fields(
//!         &id,
//!         DonorPatch {
//!             quantity: Some("7".to_string()),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod connection;
mod record;
mod service;

pub use connection::Connection;
pub use record::{BloodGroupSearch, CollectionRecord, DeletableRecord, merge_text};
pub use service::DocumentCollection;
