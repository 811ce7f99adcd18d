//! Tolerant decoding for text fields.
//!
//! Stored documents are written by other clients too, so a field the schemas
//! type as text may hold a number, a boolean or a nested value. Those decode
//! as their JSON text instead of failing the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decodes any JSON value as optional text. `null` is absent, strings are
/// taken as they are and every other value becomes its JSON rendering.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "super::deserialize")]
        value: Option<String>,
    }

    fn decode(value: serde_json::Value) -> Option<String> {
        serde_json::from_value::<Wrapper>(value).unwrap().value
    }

    #[test]
    fn test_scalars_decode_as_text() {
        assert_eq!(decode(json!({"value": "O+"})).as_deref(), Some("O+"));
        assert_eq!(decode(json!({"value": 5})).as_deref(), Some("5"));
        assert_eq!(decode(json!({"value": 2.5})).as_deref(), Some("2.5"));
        assert_eq!(decode(json!({"value": true})).as_deref(), Some("true"));
    }

    #[test]
    fn test_nested_values_decode_as_json_text() {
        assert_eq!(
            decode(json!({"value": {"lat": 1.5}})).as_deref(),
            Some(r#"{"lat":1.5}"#)
        );
    }

    #[test]
    fn test_null_and_missing_are_absent() {
        assert_eq!(decode(json!({"value": null})), None);
        assert_eq!(decode(json!({})), None);
    }
}
