//! # Record Ledger Service
//!
//! `KvLedger` implements every repository port on top of a single
//! `KeyValueStore`. Multi-row changes are expressed as one
//! `atomic_batch_write`, and every read-check-write sequence runs while
//! holding the write lock, so concurrent callers observe them as a unit.

use crate::adapters::memory::InMemoryKVStore;
use crate::domain::codec::{decode, encode, printable_key};
use crate::domain::keys::KeyPrefix;
use crate::ports::inbound::{
    AuditLog, NotificationRepository, RecordRepository, SettleOutcome, VoteRepository, VoteWrite,
};
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use shared_types::{
    Notification, NotificationId, Record, RecordId, RecordStatus, StatusHistoryEntry,
    StorageError, StorageResult, UserId, Vote, VoteKind,
};
use tracing::{debug, warn};

/// Repository implementation over a key-value store.
pub struct KvLedger<KV: KeyValueStore> {
    kv: RwLock<KV>,
}

impl KvLedger<InMemoryKVStore> {
    /// Ledger over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryKVStore::new())
    }
}

impl<KV: KeyValueStore> KvLedger<KV> {
    pub fn new(kv: KV) -> Self {
        Self {
            kv: RwLock::new(kv),
        }
    }

    fn read_row<T: DeserializeOwned>(kv: &KV, key: &[u8]) -> StorageResult<Option<T>> {
        match kv.get(key)? {
            Some(bytes) => decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn scan_rows<T: DeserializeOwned>(kv: &KV, prefix: &[u8]) -> StorageResult<Vec<T>> {
        kv.prefix_scan(prefix)?
            .iter()
            .map(|(key, bytes)| decode(key, bytes))
            .collect()
    }

    fn history_len(kv: &KV, record: &RecordId) -> StorageResult<u32> {
        let rows = kv.prefix_scan(&KeyPrefix::History.for_record(record))?;
        u32::try_from(rows.len())
            .map_err(|_| StorageError::Unavailable(format!("history of {record} overflows")))
    }
}

impl<KV: KeyValueStore> RecordRepository for KvLedger<KV> {
    fn get_record(&self, id: &RecordId) -> StorageResult<Option<Record>> {
        let kv = self.kv.read();
        Self::read_row(&kv, &KeyPrefix::record_key(id))
    }

    fn put_record(&self, record: &Record) -> StorageResult<()> {
        let mut kv = self.kv.write();
        kv.put(&KeyPrefix::record_key(&record.id), &encode(record)?)?;
        Ok(())
    }

    fn commit_transition(
        &self,
        record: &Record,
        entry: &StatusHistoryEntry,
    ) -> StorageResult<Record> {
        let record_key = KeyPrefix::record_key(&record.id);
        let history_key = KeyPrefix::history_key(&record.id, entry.sequence);

        let mut kv = self.kv.write();
        if kv.exists(&history_key)? {
            return Err(StorageError::Immutable(printable_key(&history_key)));
        }
        let Some(mut stored) = Self::read_row::<Record>(&kv, &record_key)? else {
            return Err(StorageError::Conflict(format!("record {} no longer exists", record.id)));
        };
        if stored.status != entry.old_status {
            return Err(StorageError::Conflict(format!(
                "record {} is {}, transition expected {}",
                record.id, stored.status, entry.old_status
            )));
        }

        stored.status = entry.new_status;
        stored.assigned_admin = record.assigned_admin;
        stored.resolution_notes.clone_from(&record.resolution_notes);
        stored.updated_at = entry.timestamp;
        kv.atomic_batch_write(vec![
            BatchOperation::put(record_key, encode(&stored)?),
            BatchOperation::put(history_key, encode(entry)?),
        ])?;
        debug!(record = %record.id, sequence = entry.sequence, "Committed transition");
        Ok(stored)
    }

    fn update_draft_fields(&self, draft: &Record) -> StorageResult<Option<Record>> {
        let record_key = KeyPrefix::record_key(&draft.id);
        let mut kv = self.kv.write();
        let Some(mut stored) = Self::read_row::<Record>(&kv, &record_key)? else {
            return Ok(None);
        };
        if stored.status != RecordStatus::Draft {
            return Err(StorageError::Conflict(format!(
                "record {} is {}, not a draft",
                draft.id, stored.status
            )));
        }

        stored.kind = draft.kind;
        stored.title.clone_from(&draft.title);
        stored.description.clone_from(&draft.description);
        stored.location = draft.location.clone();
        stored.urgency = draft.urgency;
        stored.updated_at = draft.updated_at;
        kv.put(&record_key, &encode(&stored)?)?;
        Ok(Some(stored))
    }

    fn delete_record(&self, id: &RecordId) -> StorageResult<Option<Record>> {
        let mut kv = self.kv.write();
        let record_key = KeyPrefix::record_key(id);
        let Some(record) = Self::read_row::<Record>(&kv, &record_key)? else {
            return Ok(None);
        };

        let mut ops = vec![BatchOperation::delete(record_key)];
        for prefix in KeyPrefix::CHILDREN {
            for (key, _) in kv.prefix_scan(&prefix.for_record(id))? {
                ops.push(BatchOperation::delete(key));
            }
        }
        let removed = ops.len();
        kv.atomic_batch_write(ops)?;
        debug!(record = %id, rows = removed, "Deleted record");
        Ok(Some(record))
    }

    fn list_records(&self) -> StorageResult<Vec<Record>> {
        let kv = self.kv.read();
        Self::scan_rows(&kv, KeyPrefix::Record.as_bytes())
    }
}

impl<KV: KeyValueStore> AuditLog for KvLedger<KV> {
    fn next_sequence(&self, record: &RecordId) -> StorageResult<u32> {
        let kv = self.kv.read();
        Self::history_len(&kv, record)
    }

    fn history_page(
        &self,
        record: &RecordId,
        from: u32,
        limit: usize,
    ) -> StorageResult<Vec<StatusHistoryEntry>> {
        let kv = self.kv.read();
        let prefix = KeyPrefix::History.for_record(record);
        let start = KeyPrefix::history_key(record, from);
        kv.range_scan(&prefix, &start, limit)?
            .iter()
            .map(|(key, bytes)| decode(key, bytes))
            .collect()
    }
}

impl<KV: KeyValueStore> VoteRepository for KvLedger<KV> {
    fn get_vote(&self, record: &RecordId, user: &UserId) -> StorageResult<Option<Vote>> {
        let kv = self.kv.read();
        Self::read_row(&kv, &KeyPrefix::vote_key(record, user))
    }

    fn insert_vote(&self, vote: &Vote) -> StorageResult<VoteWrite> {
        let mut kv = self.kv.write();
        let record_key = KeyPrefix::record_key(&vote.record_id);
        let Some(mut record) = Self::read_row::<Record>(&kv, &record_key)? else {
            return Ok(VoteWrite::RecordMissing);
        };
        let vote_key = KeyPrefix::vote_key(&vote.record_id, &vote.user_id);
        if kv.exists(&vote_key)? {
            return Ok(VoteWrite::Duplicate);
        }

        record.vote_count = record.vote_count.saturating_add(1);
        kv.atomic_batch_write(vec![
            BatchOperation::put(vote_key, encode(vote)?),
            BatchOperation::put(record_key, encode(&record)?),
        ])?;
        Ok(VoteWrite::Applied {
            vote_count: record.vote_count,
        })
    }

    fn remove_vote(&self, record_id: &RecordId, user: &UserId) -> StorageResult<VoteWrite> {
        let mut kv = self.kv.write();
        let record_key = KeyPrefix::record_key(record_id);
        let Some(mut record) = Self::read_row::<Record>(&kv, &record_key)? else {
            return Ok(VoteWrite::RecordMissing);
        };
        let vote_key = KeyPrefix::vote_key(record_id, user);
        if !kv.exists(&vote_key)? {
            return Ok(VoteWrite::NotFound);
        }

        if record.vote_count == 0 {
            warn!(record = %record_id, "Vote count already zero while a vote row exists");
        }
        record.vote_count = record.vote_count.saturating_sub(1);
        kv.atomic_batch_write(vec![
            BatchOperation::delete(vote_key),
            BatchOperation::put(record_key, encode(&record)?),
        ])?;
        Ok(VoteWrite::Applied {
            vote_count: record.vote_count,
        })
    }

    fn update_vote_kind(
        &self,
        record_id: &RecordId,
        user: &UserId,
        kind: VoteKind,
    ) -> StorageResult<VoteWrite> {
        let mut kv = self.kv.write();
        let Some(record) = Self::read_row::<Record>(&kv, &KeyPrefix::record_key(record_id))? else {
            return Ok(VoteWrite::RecordMissing);
        };
        let vote_key = KeyPrefix::vote_key(record_id, user);
        let Some(mut vote) = Self::read_row::<Vote>(&kv, &vote_key)? else {
            return Ok(VoteWrite::NotFound);
        };

        vote.kind = kind;
        kv.put(&vote_key, &encode(&vote)?)?;
        Ok(VoteWrite::Applied {
            vote_count: record.vote_count,
        })
    }

    fn votes_for(&self, record: &RecordId) -> StorageResult<Vec<Vote>> {
        let kv = self.kv.read();
        Self::scan_rows(&kv, &KeyPrefix::Vote.for_record(record))
    }

    fn reconcile_vote_count(&self, record_id: &RecordId) -> StorageResult<VoteWrite> {
        let mut kv = self.kv.write();
        let record_key = KeyPrefix::record_key(record_id);
        let Some(mut record) = Self::read_row::<Record>(&kv, &record_key)? else {
            return Ok(VoteWrite::RecordMissing);
        };
        let actual = kv.prefix_scan(&KeyPrefix::Vote.for_record(record_id))?.len();
        let actual = u32::try_from(actual).unwrap_or(u32::MAX);

        if record.vote_count != actual {
            warn!(
                record = %record_id,
                stored = record.vote_count,
                actual,
                "Vote count drift corrected"
            );
            record.vote_count = actual;
            kv.put(&record_key, &encode(&record)?)?;
        }
        Ok(VoteWrite::Applied { vote_count: actual })
    }
}

impl<KV: KeyValueStore> NotificationRepository for KvLedger<KV> {
    fn insert_notification(&self, notification: &Notification) -> StorageResult<bool> {
        let value = encode(notification)?;
        let mut kv = self.kv.write();
        if !kv.exists(&KeyPrefix::record_key(&notification.record_id))? {
            return Ok(false);
        }
        kv.put(
            &KeyPrefix::notification_key(&notification.record_id, &notification.id),
            &value,
        )?;
        Ok(true)
    }

    fn get_notification(
        &self,
        record: &RecordId,
        id: &NotificationId,
    ) -> StorageResult<Option<Notification>> {
        let kv = self.kv.read();
        Self::read_row(&kv, &KeyPrefix::notification_key(record, id))
    }

    fn settle_notification(&self, notification: &Notification) -> StorageResult<SettleOutcome> {
        let key = KeyPrefix::notification_key(&notification.record_id, &notification.id);
        let value = encode(notification)?;
        let mut kv = self.kv.write();
        let Some(stored) = Self::read_row::<Notification>(&kv, &key)? else {
            return Ok(SettleOutcome::Orphaned);
        };
        if stored.status.is_terminal() {
            return Err(StorageError::Immutable(printable_key(&key)));
        }
        kv.put(&key, &value)?;
        Ok(SettleOutcome::Settled)
    }

    fn notifications_for(&self, record: &RecordId) -> StorageResult<Vec<Notification>> {
        let kv = self.kv.read();
        let mut rows: Vec<Notification> =
            Self::scan_rows(&kv, &KeyPrefix::Notification.for_record(record))?;
        rows.sort_by_key(|n| n.created_at);
        Ok(rows)
    }
}
