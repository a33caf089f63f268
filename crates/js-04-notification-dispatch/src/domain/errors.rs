//! Dispatch error types

use super::report::DispatchReport;
use shared_types::{RecordId, StorageError};
use thiserror::Error;

/// Failure reported by a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Retryable: provider unavailable, timeout, throttling.
    #[error("transient: {0}")]
    Transient(String),

    /// Not retryable: invalid address, rejected content.
    #[error("permanent: {0}")]
    Permanent(String),
}

impl ChannelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Errors from a dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Storage failed before any entry was queued.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Some recipient × channel pairs got no entry because storage failed
    /// while queueing them. `report` covers the pairs that were queued, all
    /// of which ran to completion.
    #[error("{unqueued} notification(s) for record {record_id} could not be queued: {source}")]
    Incomplete {
        record_id: RecordId,
        unqueued: usize,
        report: Box<DispatchReport>,
        source: StorageError,
    },
}

impl DispatchError {
    /// Deliveries that ran before the error.
    pub fn partial_report(&self) -> Option<&DispatchReport> {
        match self {
            Self::Incomplete { report, .. } => Some(report),
            Self::Storage(_) => None,
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
