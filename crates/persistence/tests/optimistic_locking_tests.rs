//! Tests for revision-checked writes.
//!
//! Racing writers are not coordinated by the client: the store accepts the
//! first write at a revision and rejects every later one with a conflict.

mod common;

use blaster_persistence::error::{StorageError, StoreError};
use blaster_persistence::schemas::{DonorPatch, DonorRecord, LedgerPatch};

use common::*;

async fn seed_donor(donors: &blaster_persistence::DonorClient, id: &str) -> String {
    donors
        .create(DonorRecord {
            id: Some(id.to_string()),
            ..donor("x", "O+")
        })
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .revision
}

fn at_revision(id: &str, revision: &str, quantity: &str) -> DonorRecord {
    DonorRecord {
        id: Some(id.to_string()),
        revision: Some(revision.to_string()),
        donor_id: Some("x".to_string()),
        quantity: Some(quantity.to_string()),
        ..Default::default()
    }
}

fn assert_conflict(err: &StorageError) {
    assert!(
        matches!(err, StorageError::Store(StoreError::Conflict { .. })),
        "expected conflict, got {err:?}"
    );
}

// ============================================================================
// Concurrent Writers
// ============================================================================

/// Test that two direct updates from the same revision cannot both succeed.
#[tokio::test]
async fn test_concurrent_updates_from_same_revision() {
    let store = create_store();
    let donors = donor_client(&store).await;
    let revision = seed_donor(&donors, "d1").await;

    let (a, b) = tokio::join!(
        donors.update(at_revision("d1", &revision, "7")),
        donors.update(at_revision("d1", &revision, "8")),
    );

    let (winner, loser) = match (a, b) {
        (Ok(winner), Err(loser)) => (winner, loser),
        (Err(loser), Ok(winner)) => (winner, loser),
        other => panic!("expected exactly one success, got {other:?}"),
    };
    assert_conflict(&loser);

    let stored = store.snapshot(DONORS, "d1").unwrap();
    assert_eq!(stored.revision, winner.into_data().map(|u| u.revision));
}

/// Test that two merge updates racing on one document cannot both succeed.
#[tokio::test]
async fn test_concurrent_merge_updates() {
    let store = create_store();
    let donors = donor_client(&store).await;
    seed_donor(&donors, "d1").await;

    let (a, b) = tokio::join!(
        donors.update_fields(
            "d1",
            DonorPatch {
                quantity: Some("7".to_string()),
                ..Default::default()
            },
        ),
        donors.update_fields(
            "d1",
            DonorPatch {
                contact: Some("555-0100".to_string()),
                ..Default::default()
            },
        ),
    );

    let outcomes = [a, b];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert_conflict(err);
        }
    }
}

// ============================================================================
// Stale Revisions
// ============================================================================

/// Test that a write at a superseded revision is rejected and changes nothing.
#[tokio::test]
async fn test_stale_revision_is_rejected() {
    let store = create_store();
    let donors = donor_client(&store).await;
    let first = seed_donor(&donors, "d1").await;

    donors.update(at_revision("d1", &first, "2")).await.unwrap();
    let current = store.snapshot(DONORS, "d1").unwrap();

    let err = donors
        .update(at_revision("d1", &first, "3"))
        .await
        .unwrap_err();

    assert_conflict(&err);
    assert_eq!(err.status_code(), Some(409));
    assert_eq!(store.snapshot(DONORS, "d1").unwrap(), current);
}

/// Test that a write without revision cannot overwrite an existing document.
#[tokio::test]
async fn test_missing_revision_is_rejected() {
    let store = create_store();
    let donors = donor_client(&store).await;
    seed_donor(&donors, "d1").await;

    let err = donors
        .update(DonorRecord {
            id: Some("d1".to_string()),
            quantity: Some("3".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_conflict(&err);
}

/// Test that a successful update changes exactly one document's revision.
#[tokio::test]
async fn test_update_touches_one_document() {
    let store = create_store();
    let donors = donor_client(&store).await;
    seed_donor(&donors, "d1").await;
    seed_donor(&donors, "d2").await;

    let untouched = store.snapshot(DONORS, "d2").unwrap();
    let before = store.snapshot(DONORS, "d1").unwrap().revision;

    donors
        .update_fields(
            "d1",
            DonorPatch {
                quantity: Some("4".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_ne!(store.snapshot(DONORS, "d1").unwrap().revision, before);
    assert_eq!(store.snapshot(DONORS, "d2").unwrap(), untouched);
}

/// Test that consecutive ledger merges each read and write the current revision.
#[tokio::test]
async fn test_ledger_consecutive_merges_use_fresh_revision() {
    let store = create_store();
    let ledger = ledger_client(&store).await;

    let id = ledger
        .create(ledger_entry("x", "O+"))
        .await
        .unwrap()
        .into_data()
        .unwrap()
        .id;

    for status in ["IN_TRANSIT", "DELIVERED"] {
        let result = ledger
            .update_fields(
                &id,
                LedgerPatch {
                    status: Some(status.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.status_code, 200);
    }

    let stored = store.snapshot(LEDGER, &id).unwrap();
    assert_eq!(stored.fields["status"], "DELIVERED");
    assert!(stored.revision.unwrap().starts_with("3-"));
}
