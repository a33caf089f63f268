use serde::{Deserialize, Serialize};
use shared_types::{Vote, VoteKind};

/// Vote counts recomputed from live vote rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub support: u32,
    pub urgent: u32,
}

impl VoteTally {
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        let mut tally = Self::default();
        for vote in votes {
            match vote.kind {
                VoteKind::Support => tally.support += 1,
                VoteKind::Urgent => tally.urgent += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> u32 {
        self.support + self.urgent
    }

    /// Whether enough citizens flagged the record as urgent.
    ///
    /// A threshold of zero disables vote-driven escalation.
    pub fn escalates(&self, urgent_threshold: u32) -> bool {
        urgent_threshold > 0 && self.urgent >= urgent_threshold
    }
}
