//! Error types for the transition engine

use shared_types::{RecordId, RecordStatus, StorageError};
use thiserror::Error;

/// Transition engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// `(from, to)` is not an edge of the lifecycle, or re-assignment named
    /// no new assignee.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: RecordStatus, to: RecordStatus },

    /// The target state needs a reason or resolution notes.
    #[error("Transition to {to} requires {what}")]
    MissingReason { to: RecordStatus, what: &'static str },

    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: RecordId },

    /// The actor may not perform this action on this record.
    #[error("Not permitted: {action}")]
    Forbidden { action: &'static str },

    /// Citizen mutation of a record that already left `draft`.
    #[error("Record {record_id} is {status}; only drafts can be changed by their creator")]
    NotDraft {
        record_id: RecordId,
        status: RecordStatus,
    },

    /// Fatal: the atomic write did not happen.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TransitionError {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::MissingReason { .. } => "missing_reason",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::NotDraft { .. } => "not_draft",
            Self::Storage(_) => "storage",
        }
    }
}

/// Result type for transition operations
pub type TransitionResult<T> = Result<T, TransitionError>;
