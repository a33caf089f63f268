//! # Domain Errors
//!
//! Backend errors and their mapping onto the shared `StorageError`.

use shared_types::StorageError;
use thiserror::Error;

/// Errors raised by key-value backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// Backend I/O failure.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Injected failure (test doubles).
    #[error("KV store fault injected: {operation}")]
    Injected { operation: &'static str },
}

impl From<KVStoreError> for StorageError {
    fn from(err: KVStoreError) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}
