//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Storage unavailability or corruption.
///
/// Fatal to the calling operation and never retried inside the component
/// that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing store rejected or failed the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be decoded.
    #[error("Corrupt entry under key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// A value could not be encoded for storage.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// An immutable row was asked to change.
    #[error("Immutable entry {0} cannot be modified")]
    Immutable(String),

    /// The stored row is not in the state the write was computed against.
    #[error("Conflicting write: {0}")]
    Conflict(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A string did not name any variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {what}: {value:?}")]
pub struct ParseEnumError {
    pub what: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}
