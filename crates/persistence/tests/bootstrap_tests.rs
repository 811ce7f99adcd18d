//! Tests for the collection connection bootstrap.

mod common;

use std::sync::Arc;

use blaster_persistence::backends::memory::MemoryStore;
use blaster_persistence::error::{ConnectionError, StorageError};
use blaster_persistence::schemas::{DonorClient, DonorRecord, LedgerClient};

use common::*;

// ============================================================================
// Collection Creation
// ============================================================================

/// Test that an existing collection is reused without a create call.
#[tokio::test]
async fn test_bootstrap_existing_collection_skips_create() {
    let store = Arc::new(MemoryStore::with_collections(&[DONORS]));
    let client = DonorClient::with_default_name(store.clone());

    let handle = client.bootstrap().await.unwrap();

    assert_eq!(handle.name(), DONORS);
    assert_eq!(store.create_collection_calls(), 0);

    let found = client.find(None).await.unwrap();
    assert_eq!(found.data.as_deref(), Some("[]"));
}

/// Test that a missing collection is created exactly once.
#[tokio::test]
async fn test_bootstrap_creates_missing_collection() {
    let store = create_store();
    let client = donor_client(&store).await;

    assert!(store.has_collection(DONORS));
    assert_eq!(store.create_collection_calls(), 1);
    assert!(client.is_ready());
}

/// Test that losing a creation race to another process still connects.
#[tokio::test]
async fn test_bootstrap_tolerates_concurrent_creation() {
    let store = create_store();
    let first = DonorClient::with_default_name(store.clone());
    let second = DonorClient::with_default_name(store.clone());

    let (a, b) = tokio::join!(first.bootstrap(), second.bootstrap());

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(store.create_collection_calls(), 2);
    assert!(store.has_collection(DONORS));
}

/// Test that the donor and ledger clients share one store.
#[tokio::test]
async fn test_bootstrap_two_collections_on_one_store() {
    let store = create_store();
    donor_client(&store).await;
    ledger_client(&store).await;

    assert!(store.has_collection(DONORS));
    assert!(store.has_collection(LEDGER));
}

/// Test that a configured collection name overrides the default.
#[tokio::test]
async fn test_bootstrap_custom_collection_name() {
    let store = create_store();
    let client = LedgerClient::new(store.clone(), "ledger_staging");

    client.bootstrap().await.unwrap();

    assert_eq!(client.name(), "ledger_staging");
    assert!(store.has_collection("ledger_staging"));
    assert!(!store.has_collection(LEDGER));
}

// ============================================================================
// Readiness
// ============================================================================

/// Test that operations before bootstrap fail as not ready.
#[tokio::test]
async fn test_operations_before_bootstrap_are_not_ready() {
    let store = create_store();
    let client = DonorClient::with_default_name(store.clone());

    let err = client.find(None).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Connection(ConnectionError::NotReady { .. })
    ));

    let err = client.create(donor("x", "O+")).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Connection(ConnectionError::NotReady { .. })
    ));

    let err = client.delete_by_id("d1").await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Connection(ConnectionError::NotReady { .. })
    ));
    assert!(!store.has_collection(DONORS));
}

/// Test that a background bootstrap becomes ready.
#[tokio::test]
async fn test_open_bootstraps_in_background() {
    let store = create_store();
    let client = DonorClient::open(store.clone(), DONORS);

    let handle = client.ready().await.unwrap();

    assert_eq!(handle.name(), DONORS);
    assert!(client.is_ready());
    assert_eq!(client.create(donor("x", "O+")).await.unwrap().status_code, 201);
}

/// Test that bootstrap cannot be started twice.
#[tokio::test]
async fn test_second_bootstrap_is_rejected() {
    let store = create_store();
    let client = donor_client(&store).await;

    let err = client.bootstrap().await.unwrap_err();

    assert!(matches!(
        err,
        StorageError::Connection(ConnectionError::AlreadyStarted { .. })
    ));
    assert_eq!(store.create_collection_calls(), 1);
    assert!(client.find(None).await.is_ok());
}

// ============================================================================
// Bootstrap Failure
// ============================================================================

/// Test that rejected credentials abort bootstrap.
#[tokio::test]
async fn test_rejected_credentials_abort_bootstrap() {
    let store = Arc::new(MemoryStore::new().reject_credentials());
    let client = DonorClient::with_default_name(store.clone());

    let err = client.bootstrap().await.unwrap_err();

    match err {
        StorageError::Connection(ConnectionError::BootstrapFailed { collection, source }) => {
            assert_eq!(collection, DONORS);
            assert_eq!(source.status_code(), Some(401));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!store.has_collection(DONORS));
    assert_eq!(store.create_collection_calls(), 0);
}

/// Test that a failed bootstrap is reported by every later operation.
#[tokio::test]
async fn test_failed_bootstrap_is_fatal_for_operations() {
    let store = Arc::new(MemoryStore::new().fail_collection_creation());
    let client = DonorClient::open(store.clone(), DONORS);

    assert!(client.ready().await.is_err());

    let err = client.find(None).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Connection(ConnectionError::BootstrapFailed { .. })
    ));

    let err = client
        .update(DonorRecord {
            id: Some("d1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Connection(ConnectionError::BootstrapFailed { .. })
    ));
}

// ============================================================================
// Info
// ============================================================================

/// Test that info reports the store's collection metadata.
#[tokio::test]
async fn test_info_reports_collection_metadata() {
    let store = create_store();
    let client = donor_client(&store).await;

    client.create(donor("x", "O+")).await.unwrap();
    client.create(donor("y", "A-")).await.unwrap();

    let info = client.info().await.unwrap();

    assert_eq!(info.db_name, DONORS);
    assert_eq!(info.doc_count, 2);
    assert_eq!(info.doc_del_count, 0);
    assert_eq!(info.extra["update_seq"], "2");
}

/// Test that info on a collection the store does not hold fails with 404.
#[tokio::test]
async fn test_info_on_missing_collection() {
    let client = DonorClient::with_default_name(create_store());

    let err = client.info().await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}
