//! # Inbound Ports (Driving Ports)
//!
//! Repository traits consumed by the transition engine, the vote aggregator
//! and the notification dispatcher.
//!
//! Every method that changes more than one row does so in a single atomic
//! batch, and every check-then-write happens under the ledger's write lock.

use crate::domain::stats::StatusDistribution;
use shared_types::{
    Notification, NotificationId, Record, RecordId, StatusHistoryEntry, StorageResult, UserId,
    Vote, VoteKind,
};

/// Record rows.
pub trait RecordRepository: Send + Sync {
    fn get_record(&self, id: &RecordId) -> StorageResult<Option<Record>>;

    /// Insert or overwrite a whole record row without touching its children.
    fn put_record(&self, record: &Record) -> StorageResult<()>;

    /// Apply a lifecycle change and append its audit entry in one batch.
    ///
    /// The stored row is re-read under the write lock. Status and
    /// `updated_at` come from the entry, assignee and resolution notes from
    /// `record`; every other field (the vote count in particular) keeps its
    /// stored value. Returns the row as written.
    ///
    /// Fails with `StorageError::Immutable` if the entry's sequence slot is
    /// already taken, and with `StorageError::Conflict` if the record is
    /// gone or its stored status is not the entry's `old_status`.
    fn commit_transition(
        &self,
        record: &Record,
        entry: &StatusHistoryEntry,
    ) -> StorageResult<Record>;

    /// Copy a draft's editable fields onto the stored row.
    ///
    /// Kind, title, description, location, urgency and `updated_at` come
    /// from `draft`; everything else keeps its stored value. Returns the row
    /// as written, or `None` if the record does not exist. Fails with
    /// `StorageError::Conflict` if the stored row is no longer a draft.
    fn update_draft_fields(&self, draft: &Record) -> StorageResult<Option<Record>>;

    /// Remove the record with its history, votes and notifications.
    ///
    /// Returns the removed record, or `None` if it did not exist.
    fn delete_record(&self, id: &RecordId) -> StorageResult<Option<Record>>;

    fn list_records(&self) -> StorageResult<Vec<Record>>;

    /// Count records per status and kind.
    fn status_distribution(&self) -> StorageResult<StatusDistribution> {
        let records = self.list_records()?;
        Ok(StatusDistribution::from_records(&records))
    }
}

/// Append-only status history.
pub trait AuditLog: Send + Sync {
    /// Sequence number the next entry for `record` must carry.
    fn next_sequence(&self, record: &RecordId) -> StorageResult<u32>;

    /// Up to `limit` entries with `sequence >= from`, in sequence order.
    fn history_page(
        &self,
        record: &RecordId,
        from: u32,
        limit: usize,
    ) -> StorageResult<Vec<StatusHistoryEntry>>;
}

/// Outcome of a vote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteWrite {
    /// The write happened; the record's count after it.
    Applied { vote_count: u32 },
    /// `(record, user)` already voted; nothing written.
    Duplicate,
    /// No vote by that user on that record; nothing written.
    NotFound,
    /// The record does not exist.
    RecordMissing,
}

/// Votes and the denormalized count on the record row.
pub trait VoteRepository: Send + Sync {
    fn get_vote(&self, record: &RecordId, user: &UserId) -> StorageResult<Option<Vote>>;

    /// Insert the vote and increment the count in one batch.
    fn insert_vote(&self, vote: &Vote) -> StorageResult<VoteWrite>;

    /// Delete the vote and decrement the count in one batch.
    fn remove_vote(&self, record: &RecordId, user: &UserId) -> StorageResult<VoteWrite>;

    /// Change an existing vote's kind. The count is untouched.
    fn update_vote_kind(
        &self,
        record: &RecordId,
        user: &UserId,
        kind: VoteKind,
    ) -> StorageResult<VoteWrite>;

    fn votes_for(&self, record: &RecordId) -> StorageResult<Vec<Vote>>;

    /// Recompute the count from the vote rows and store it.
    fn reconcile_vote_count(&self, record: &RecordId) -> StorageResult<VoteWrite>;
}

/// Outcome of settling a delivery entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Stored with its terminal status.
    Settled,
    /// The entry (and its record) were deleted meanwhile.
    Orphaned,
}

/// Notification delivery log.
pub trait NotificationRepository: Send + Sync {
    /// Store a new pending entry.
    ///
    /// Returns `false` without writing if the record no longer exists.
    fn insert_notification(&self, notification: &Notification) -> StorageResult<bool>;

    fn get_notification(
        &self,
        record: &RecordId,
        id: &NotificationId,
    ) -> StorageResult<Option<Notification>>;

    /// Overwrite a pending entry with its terminal form.
    ///
    /// Fails with `StorageError::Immutable` if the stored entry already
    /// reached a terminal status.
    fn settle_notification(&self, notification: &Notification) -> StorageResult<SettleOutcome>;

    /// All entries for a record, oldest first.
    fn notifications_for(&self, record: &RecordId) -> StorageResult<Vec<Notification>>;
}
