//! Core types for the persistence layer.
//!
//! - [`Document`] - The untyped document exchanged with the store
//! - [`Selector`] - Field-equality query filter
//! - [`ResultEnvelope`] - The `{data, statusCode}` result contract
//!
//! # Examples
//!
//! ```
//! use blaster_persistence::types::{ResultEnvelope, Selector};
//!
//! let selector = Selector::new().field("bloodGroup", "O+");
//! assert_eq!(selector.len(), 1);
//!
//! let envelope = ResultEnvelope::ok("[]".to_string());
//! assert_eq!(envelope.status_code, 200);
//! ```

mod document;
mod envelope;
mod selector;

pub use document::{Document, ID_FIELD, REVISION_FIELD};
pub use envelope::{Created, ResultEnvelope, STATUS_CREATED, STATUS_OK, Updated};
pub use selector::Selector;
