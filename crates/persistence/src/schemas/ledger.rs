//! Ledger records, stored in the ledger collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::{BloodGroupSearch, CollectionRecord, DocumentCollection, merge_text};
use crate::config::DEFAULT_LEDGER_COLLECTION;
use crate::types::Selector;

use super::text;

/// Client for the ledger collection. Ledger entries cannot be deleted.
pub type LedgerClient = DocumentCollection<LedgerRecord>;

/// A ledger entry tracking a donation.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub donor_id: Option<String>,

    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub blood_group: Option<String>,

    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<String>,

    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,

    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,

    /// Fields this schema does not name, kept across updates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Updatable ledger fields.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPatch {
    pub donor_id: Option<String>,
    pub blood_group: Option<String>,
    pub quantity: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

impl CollectionRecord for LedgerRecord {
    type Patch = LedgerPatch;

    const DEFAULT_COLLECTION: &'static str = DEFAULT_LEDGER_COLLECTION;
    const LOOKUP_FIELD: &'static str = "donorId";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn apply_patch(fields: &mut Map<String, Value>, patch: LedgerPatch) {
        merge_text(fields, "donorId", patch.donor_id);
        merge_text(fields, "bloodGroup", patch.blood_group);
        merge_text(fields, "quantity", patch.quantity);
        merge_text(fields, "location", patch.location);
        merge_text(fields, "status", patch.status);
    }
}

impl BloodGroupSearch for LedgerRecord {
    fn blood_group_selector(blood_group: Option<&str>) -> Selector {
        Selector::new().field_opt("bloodGroup", blood_group)
    }
}
