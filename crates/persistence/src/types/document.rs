//! Stored document type.
//!
//! This module defines the [`Document`] type, the untyped shape every record
//! takes on its way to and from the document store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageResult;

/// Name of the reserved identifier field.
pub const ID_FIELD: &str = "_id";

/// Name of the reserved revision field.
pub const REVISION_FIELD: &str = "_rev";

/// A document as the store sees it.
///
/// `Document` is a mapping of field name to JSON value with two reserved
/// fields:
///
/// - **`_id`**: globally unique, immutable once assigned
/// - **`_rev`**: opaque token assigned by the store, replaced on every write
///
/// The client never edits a stored document in place; it always submits a
/// full replacement carrying the revision it last read.
///
/// # Examples
///
/// ```
/// use blaster_persistence::types::Document;
/// use serde_json::json;
///
/// let doc: Document = serde_json::from_value(json!({
///     "_id": "d1",
///     "_rev": "1-abc",
///     "donorId": "x",
/// }))
/// .unwrap();
///
/// assert_eq!(doc.id.as_deref(), Some("d1"));
/// assert_eq!(doc.revision.as_deref(), Some("1-abc"));
/// assert_eq!(doc.fields["donorId"], "x");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Current revision token.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// All remaining fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Creates an empty document with the given identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Sets a field, returning the document.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the value of a field, including the reserved ones.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            ID_FIELD => self.id.clone().map(Value::String),
            REVISION_FIELD => self.revision.clone().map(Value::String),
            _ => self.fields.get(name).cloned(),
        }
    }

    /// Converts a typed record into a document.
    pub fn from_record<R: Serialize>(record: &R) -> StorageResult<Self> {
        let value = serde_json::to_value(record)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Converts this document into a typed record.
    pub fn into_record<R: DeserializeOwned>(self) -> StorageResult<R> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_fields_use_store_names() {
        let doc = Document::with_id("d1").with_field("quantity", "5");
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value, json!({"_id": "d1", "quantity": "5"}));
    }

    #[test]
    fn test_get_reserved_and_plain_fields() {
        let mut doc = Document::with_id("d1").with_field("bloodGroup", "O+");
        doc.revision = Some("2-xyz".to_string());

        assert_eq!(doc.get("_id"), Some(json!("d1")));
        assert_eq!(doc.get("_rev"), Some(json!("2-xyz")));
        assert_eq!(doc.get("bloodGroup"), Some(json!("O+")));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn test_unknown_fields_survive_deserialization() {
        let doc: Document = serde_json::from_value(json!({
            "_id": "d1",
            "donationRequest": {"status": "REQUESTED"}
        }))
        .unwrap();

        assert!(doc.revision.is_none());
        assert_eq!(doc.fields["donationRequest"]["status"], "REQUESTED");
        assert!(!doc.fields.contains_key("_id"));
    }
}
