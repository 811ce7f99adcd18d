//! Record traits binding a typed schema to a collection.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::types::Selector;

/// A typed record stored in one collection.
///
/// Implementors describe their reserved fields and how a partial update is
/// merged onto a fetched document. The collection component is generic over
/// this trait.
pub trait CollectionRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partial update merged by [`apply_patch`](Self::apply_patch).
    type Patch: Send + Sync + 'static;

    /// Collection name used when none is configured.
    const DEFAULT_COLLECTION: &'static str;

    /// Field keyed on by identifier lookups.
    const LOOKUP_FIELD: &'static str;

    /// Returns the document identifier, if assigned.
    fn id(&self) -> Option<&str>;

    /// Assigns the document identifier.
    fn set_id(&mut self, id: String);

    /// Overrides every stored field the patch provides with a non-empty
    /// value. Fields the patch leaves out keep their stored JSON values.
    fn apply_patch(fields: &mut Map<String, Value>, patch: Self::Patch);

    /// Builds the selector for an identifier lookup. An absent or empty key
    /// selects every document.
    fn lookup_selector(key: Option<&str>) -> Selector {
        Selector::new().field_opt(Self::LOOKUP_FIELD, key)
    }
}

/// Records whose collection allows deletion.
pub trait DeletableRecord: CollectionRecord {}

/// Records searchable by blood group.
pub trait BloodGroupSearch: CollectionRecord {
    /// Builds the blood-group search selector.
    fn blood_group_selector(blood_group: Option<&str>) -> Selector;
}

/// Sets `field` to `value` unless `value` is absent or empty.
pub fn merge_text(fields: &mut Map<String, Value>, field: &str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        fields.insert(field.to_string(), Value::String(value));
    }
}
