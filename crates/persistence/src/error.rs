//! Error types for the persistence layer.
//!
//! This module defines all error types used by the collection clients. Errors
//! reported by the document store are kept in their own enum, [`StoreError`],
//! and are handed back to callers unchanged. Everything the client layer itself
//! can reject (an unready connection, a missing identifier) lives in separate
//! categories so callers can tell the two apart.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all collection operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Errors reported by the document store, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Connection lifecycle errors.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Field presence errors.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A record could not be converted to or from a stored document.
    #[error("serialization error: {message}")]
    Serialization { message: String },
}

impl StorageError {
    /// Returns the store's status code if this error came from the store.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StorageError::Store(err) => err.status_code(),
            _ => None,
        }
    }

    /// Returns `true` if the store rejected a write because of a stale revision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Store(StoreError::Conflict { .. }))
    }
}

/// Errors reported by the remote document store.
///
/// Variants mirror the HTTP statuses a CouchDB-compatible store answers with.
/// The `reason` strings are the store's own words.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 404: the collection or document does not exist.
    #[error("not found: {reason}")]
    NotFound { reason: String },

    /// 409: the submitted revision is not the current one.
    #[error("document update conflict: {reason}")]
    Conflict { reason: String },

    /// 412: the collection already exists.
    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    /// 401 / 403: authentication or authorization was refused.
    #[error("unauthorized ({status}): {reason}")]
    Unauthorized { status: u16, reason: String },

    /// 400: the store could not understand the request.
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    /// 429: the store is throttling this account.
    #[error("too many requests: {reason}")]
    TooManyRequests { reason: String },

    /// Any other non-success status.
    #[error("store returned {status} {error}: {reason}")]
    Status {
        status: u16,
        error: String,
        reason: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// The store answered with a body this client cannot interpret.
    #[error("invalid store response: {message}")]
    InvalidResponse { message: String },
}

impl StoreError {
    /// Maps an HTTP status and the store's `error`/`reason` pair to a variant.
    pub fn from_status(status: u16, error: impl Into<String>, reason: impl Into<String>) -> Self {
        let error = error.into();
        let reason = reason.into();
        match status {
            400 => StoreError::BadRequest { reason },
            401 | 403 => StoreError::Unauthorized { status, reason },
            404 => StoreError::NotFound { reason },
            409 => StoreError::Conflict { reason },
            412 => StoreError::PreconditionFailed { reason },
            429 => StoreError::TooManyRequests { reason },
            _ => StoreError::Status {
                status,
                error,
                reason,
            },
        }
    }

    /// The HTTP status the store reported, if the request reached it.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StoreError::NotFound { .. } => Some(404),
            StoreError::Conflict { .. } => Some(409),
            StoreError::PreconditionFailed { .. } => Some(412),
            StoreError::Unauthorized { status, .. } => Some(*status),
            StoreError::BadRequest { .. } => Some(400),
            StoreError::TooManyRequests { .. } => Some(429),
            StoreError::Status { status, .. } => Some(*status),
            StoreError::Unavailable { .. } | StoreError::InvalidResponse { .. } => None,
        }
    }

    /// Returns `true` for a 404 answer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns `true` for a 409 answer.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Errors related to the collection connection lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Bootstrap has not completed yet. Transient.
    #[error("connection to collection '{collection}' is not ready")]
    NotReady { collection: String },

    /// Bootstrap failed. Fatal for the collection component.
    #[error("bootstrap of collection '{collection}' failed: {source}")]
    BootstrapFailed {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// `connect` was called a second time.
    #[error("bootstrap of collection '{collection}' was already started")]
    AlreadyStarted { collection: String },
}

/// Errors raised by field presence checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field the operation depends on is absent or empty.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// The store configuration failed validation.
    #[error("invalid configuration: {}", errors.join("; "))]
    InvalidConfiguration { errors: Vec<String> },
}

/// Result type alias for collection operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization {
            message: err.to_string(),
        }
    }
}
