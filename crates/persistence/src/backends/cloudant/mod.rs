//! Cloudant backend.
//!
//! Talks the CouchDB HTTP API and authenticates with an IBM Cloud IAM API
//! key exchanged for a short-lived bearer token.

mod auth;
mod client;

pub use client::CloudantClient;
