//! Vote aggregation errors

use shared_types::{RecordId, StorageError, UserId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("User {user_id} already voted on record {record_id}")]
    DuplicateVote { record_id: RecordId, user_id: UserId },

    #[error("User {user_id} has no vote on record {record_id}")]
    VoteNotFound { record_id: RecordId, user_id: UserId },

    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: RecordId },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type VoteResult<T> = Result<T, VoteError>;
