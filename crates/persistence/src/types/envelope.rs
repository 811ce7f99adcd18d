//! The `{data, statusCode}` result envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// Status code for successful reads and updates.
pub const STATUS_OK: u16 = 200;

/// Status code for successful creates.
pub const STATUS_CREATED: u16 = 201;

/// Uniform result returned by collection operations.
///
/// A resolved envelope is not necessarily a success: fetch-before-write
/// operations resolve with the store's status code and no data when the
/// document could not be fetched. Check [`is_success`](Self::is_success).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope<T> {
    /// Operation payload, absent for soft failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// HTTP-style status code.
    pub status_code: u16,
}

impl<T> ResultEnvelope<T> {
    /// Creates an envelope carrying data.
    pub fn new(data: T, status_code: u16) -> Self {
        Self {
            data: Some(data),
            status_code,
        }
    }

    /// A `200` envelope.
    pub fn ok(data: T) -> Self {
        Self::new(data, STATUS_OK)
    }

    /// A `201` envelope.
    pub fn created(data: T) -> Self {
        Self::new(data, STATUS_CREATED)
    }

    /// An envelope with only a status code.
    pub fn status_only(status_code: u16) -> Self {
        Self {
            data: None,
            status_code,
        }
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Consumes the envelope and returns the payload.
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl ResultEnvelope<String> {
    /// Parses the JSON-encoded array carried by query results.
    ///
    /// A missing payload decodes as an empty list.
    pub fn decode<R: DeserializeOwned>(&self) -> StorageResult<Vec<R>> {
        match &self.data {
            Some(data) => Ok(serde_json::from_str(data)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Payload of a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    /// Identifier of the new document.
    pub id: String,
    /// Its first revision.
    #[serde(rename = "rev")]
    pub revision: String,
}

/// Payload of a successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Updated {
    /// The document's new revision.
    #[serde(rename = "rev")]
    pub revision: String,
}
