//! Test infrastructure for the collection clients.
//!
//! Every suite runs against [`MemoryStore`], which enforces the same revision
//! rules as a remote store.

#![allow(dead_code)]

use std::sync::Arc;

use blaster_persistence::ResultEnvelope;
use blaster_persistence::backends::memory::MemoryStore;
use blaster_persistence::schemas::{
    DonationRequest, DonorClient, DonorRecord, LedgerClient, LedgerRecord,
};

/// Donor collection name used by the suites.
pub const DONORS: &str = "blaster_db";

/// Ledger collection name used by the suites.
pub const LEDGER: &str = "blockchain_db";

/// Returns a fresh empty store.
pub fn create_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Returns a bootstrapped donor client.
pub async fn donor_client(store: &Arc<MemoryStore>) -> DonorClient {
    let client = DonorClient::with_default_name(store.clone());
    client.bootstrap().await.expect("donor bootstrap failed");
    client
}

/// Returns a bootstrapped ledger client.
pub async fn ledger_client(store: &Arc<MemoryStore>) -> LedgerClient {
    let client = LedgerClient::with_default_name(store.clone());
    client.bootstrap().await.expect("ledger bootstrap failed");
    client
}

/// A donor record without identifier.
pub fn donor(donor_id: &str, blood_group: &str) -> DonorRecord {
    DonorRecord {
        donor_id: Some(donor_id.to_string()),
        name: Some(format!("Donor {}", donor_id)),
        blood_group: Some(blood_group.to_string()),
        kind: Some("blood".to_string()),
        quantity: Some("1".to_string()),
        location: Some("40.7128,-74.0060".to_string()),
        ..Default::default()
    }
}

/// A donor record with an open donation request.
pub fn requested_donor(donor_id: &str, blood_group: &str) -> DonorRecord {
    DonorRecord {
        donation_request: Some(DonationRequest::requested()),
        ..donor(donor_id, blood_group)
    }
}

/// A ledger entry without identifier.
pub fn ledger_entry(donor_id: &str, blood_group: &str) -> LedgerRecord {
    LedgerRecord {
        donor_id: Some(donor_id.to_string()),
        blood_group: Some(blood_group.to_string()),
        quantity: Some("1".to_string()),
        status: Some("PLEDGED".to_string()),
        ..Default::default()
    }
}

/// Decodes a query envelope, asserting a 200 status.
pub fn decode<R: serde::de::DeserializeOwned>(envelope: &ResultEnvelope<String>) -> Vec<R> {
    assert_eq!(envelope.status_code, 200);
    envelope.decode().expect("query payload is not a JSON array")
}
