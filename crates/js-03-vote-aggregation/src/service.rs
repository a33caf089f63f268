//! Vote Aggregator
//!
//! Translates repository outcomes into vote errors. The row and the record's
//! `vote_count` are always written together by the repository, under its
//! write lock, so concurrent votes on one record cannot lose updates.

use crate::domain::{VoteError, VoteResult, VoteTally};
use crate::metrics;
use crate::ports::inbound::VoteApi;
use js_01_record_storage::{RecordRepository, VoteRepository, VoteWrite};
use shared_types::{RecordId, TimeSource, UserId, Vote, VoteKind};
use std::sync::Arc;
use tracing::{debug, info};

pub struct VoteAggregator<R> {
    repo: Arc<R>,
    time: Arc<dyn TimeSource>,
}

impl<R: VoteRepository + RecordRepository> VoteAggregator<R> {
    pub fn new(repo: Arc<R>, time: Arc<dyn TimeSource>) -> Self {
        Self { repo, time }
    }

    fn applied(write: VoteWrite, record_id: RecordId, user_id: UserId) -> VoteResult<u32> {
        match write {
            VoteWrite::Applied { vote_count } => Ok(vote_count),
            VoteWrite::Duplicate => Err(VoteError::DuplicateVote { record_id, user_id }),
            VoteWrite::NotFound => Err(VoteError::VoteNotFound { record_id, user_id }),
            VoteWrite::RecordMissing => Err(VoteError::RecordNotFound { record_id }),
        }
    }
}

impl<R: VoteRepository + RecordRepository> VoteApi for VoteAggregator<R> {
    fn cast_vote(&self, record_id: RecordId, user_id: UserId, kind: VoteKind) -> VoteResult<u32> {
        let vote = Vote {
            record_id,
            user_id,
            kind,
            timestamp: self.time.now(),
        };
        let count = Self::applied(self.repo.insert_vote(&vote)?, record_id, user_id)?;
        debug!(record_id = %record_id, kind = kind.as_str(), vote_count = count, "Vote cast");
        metrics::record_vote_cast(kind.as_str());
        Ok(count)
    }

    fn retract_vote(&self, record_id: RecordId, user_id: UserId) -> VoteResult<u32> {
        let write = self.repo.remove_vote(&record_id, &user_id)?;
        let count = Self::applied(write, record_id, user_id)?;
        debug!(record_id = %record_id, vote_count = count, "Vote retracted");
        metrics::record_vote_retracted();
        Ok(count)
    }

    fn change_vote_kind(
        &self,
        record_id: RecordId,
        user_id: UserId,
        kind: VoteKind,
    ) -> VoteResult<u32> {
        let write = self.repo.update_vote_kind(&record_id, &user_id, kind)?;
        Self::applied(write, record_id, user_id)
    }

    fn tally(&self, record_id: RecordId) -> VoteResult<VoteTally> {
        if self.repo.get_record(&record_id)?.is_none() {
            return Err(VoteError::RecordNotFound { record_id });
        }
        let votes = self.repo.votes_for(&record_id)?;
        Ok(VoteTally::from_votes(&votes))
    }

    fn reconcile(&self, record_id: RecordId) -> VoteResult<u32> {
        match self.repo.reconcile_vote_count(&record_id)? {
            VoteWrite::Applied { vote_count } => {
                info!(record_id = %record_id, vote_count, "Vote count reconciled");
                Ok(vote_count)
            }
            _ => Err(VoteError::RecordNotFound { record_id }),
        }
    }
}
