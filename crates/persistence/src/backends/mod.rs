//! Document store implementations.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Cloudant | `cloudant` (default) | IBM Cloudant / CouchDB over HTTP with IAM authentication |
//! | Memory | always | In-process store with the same revision rules, for tests and local runs |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cloudant")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use blaster_persistence::backends::cloudant::CloudantClient;
//! use blaster_persistence::config::StoreConfig;
//!
//! let store = CloudantClient::new(&StoreConfig::from_env())?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "cloudant")]
pub mod cloudant;

pub mod memory;
