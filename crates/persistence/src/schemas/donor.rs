//! Donor records, stored in the primary collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collection::{
    BloodGroupSearch, CollectionRecord, DeletableRecord, DocumentCollection, merge_text,
};
use crate::config::DEFAULT_DONOR_COLLECTION;
use crate::types::Selector;

use super::text;

/// Donation request status matched by blood-group searches.
pub const DONOR_STATUS_REQUESTED: &str = "REQUESTED";

/// Client for the donor collection.
pub type DonorClient = DocumentCollection<DonorRecord>;

/// A blood donor and the item they offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRecord {
    /// Document identifier.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Revision this record was read at.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Application-level donor identifier, the lookup key.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub donor_id: Option<String>,

    /// Donor name.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// ABO/Rh group, e.g. `O+`.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub blood_group: Option<String>,

    /// Item type.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,

    /// Item description.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    /// Quantity available.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<String>,

    /// GPS location.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<String>,

    /// Contact details.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact: Option<String>,

    /// Owning user.
    #[serde(
        rename = "userID",
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,

    /// Open donation request, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_request: Option<DonationRequest>,

    /// Fields this schema does not name, kept across updates.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An open request for a donation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationRequest {
    /// Request state, e.g. `REQUESTED`.
    #[serde(
        default,
        deserialize_with = "text::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,

    /// Remaining request fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DonationRequest {
    /// A request in the `REQUESTED` state.
    pub fn requested() -> Self {
        Self {
            status: Some(DONOR_STATUS_REQUESTED.to_string()),
            extra: Map::new(),
        }
    }
}

/// Updatable donor fields. Absent or empty values keep the stored ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct DonorPatch {
    pub donor_id: Option<String>,
    pub name: Option<String>,
    pub blood_group: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

impl CollectionRecord for DonorRecord {
    type Patch = DonorPatch;

    const DEFAULT_COLLECTION: &'static str = DEFAULT_DONOR_COLLECTION;
    const LOOKUP_FIELD: &'static str = "donorId";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn apply_patch(fields: &mut Map<String, Value>, patch: DonorPatch) {
        merge_text(fields, "donorId", patch.donor_id);
        merge_text(fields, "name", patch.name);
        merge_text(fields, "bloodGroup", patch.blood_group);
        merge_text(fields, "type", patch.kind);
        merge_text(fields, "description", patch.description);
        merge_text(fields, "quantity", patch.quantity);
        merge_text(fields, "location", patch.location);
        merge_text(fields, "contact", patch.contact);
        merge_text(fields, "userID", patch.user_id);
    }
}

impl DeletableRecord for DonorRecord {}

impl BloodGroupSearch for DonorRecord {
    fn blood_group_selector(blood_group: Option<&str>) -> Selector {
        Selector::new().field_opt("bloodGroup", blood_group).field(
            "donationRequest",
            serde_json::json!({ "status": DONOR_STATUS_REQUESTED }),
        )
    }
}
