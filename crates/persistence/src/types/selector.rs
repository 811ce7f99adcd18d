//! Field-equality selectors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::Document;

/// A field-equality filter used for queries.
///
/// Serializes to the store's selector syntax (`{"field": value, ...}`).
/// Fields the caller did not supply are left out of the mapping entirely; an
/// empty selector matches every document.
///
/// Nested objects match as sub-documents: `{"donationRequest": {"status":
/// "REQUESTED"}}` matches any document whose `donationRequest.status` is
/// `"REQUESTED"`, whatever else `donationRequest` holds.
///
/// ```
/// use blaster_persistence::types::Selector;
///
/// let selector = Selector::new()
///     .field_opt("donorId", Some("x"))
///     .field_opt("bloodGroup", None);
///
/// assert_eq!(selector.len(), 1);
/// assert_eq!(serde_json::to_string(&selector).unwrap(), r#"{"donorId":"x"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(Map<String, Value>);

impl Selector {
    /// Creates an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `name` to equal `value`.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Requires `name` to equal `value` when a non-empty value is given.
    pub fn field_opt(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    /// Number of constrained fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the selector matches every document.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the expected value for a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the underlying field mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Evaluates the selector against a document.
    pub fn matches(&self, document: &Document) -> bool {
        self.0.iter().all(|(name, expected)| {
            document
                .get(name)
                .is_some_and(|actual| value_matches(expected, &actual))
        })
    }
}

fn value_matches(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|nested| value_matches(value, nested))
        }),
        _ => expected == actual,
    }
}
