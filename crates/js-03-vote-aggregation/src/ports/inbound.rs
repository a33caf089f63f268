//! # Inbound Ports (Driving Ports)

use crate::domain::{VoteResult, VoteTally};
use shared_types::{RecordId, UserId, VoteKind};

/// Vote aggregation API.
///
/// Mutations return the record's vote count after the change.
pub trait VoteApi: Send + Sync {
    /// Fails with `DuplicateVote` if the user already voted on the record.
    fn cast_vote(&self, record_id: RecordId, user_id: UserId, kind: VoteKind) -> VoteResult<u32>;

    /// Fails with `VoteNotFound` if the user has no vote on the record.
    fn retract_vote(&self, record_id: RecordId, user_id: UserId) -> VoteResult<u32>;

    /// Switch between support and urgent without touching the count.
    fn change_vote_kind(
        &self,
        record_id: RecordId,
        user_id: UserId,
        kind: VoteKind,
    ) -> VoteResult<u32>;

    fn tally(&self, record_id: RecordId) -> VoteResult<VoteTally>;

    /// Rewrite the stored count from the live vote rows.
    fn reconcile(&self, record_id: RecordId) -> VoteResult<u32>;
}
