//! Storage key layout.
//!
//! Every child row of a record (history, votes, notifications) is keyed
//! under the record's 16 id bytes, so one prefix scan finds them all and a
//! delete can cascade in a single batch.

use shared_types::{NotificationId, RecordId, UserId};

/// Key prefixes for the different row types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Record row: `r:{record}` -> Record
    Record,
    /// Audit entry: `h:{record}{sequence:be32}` -> StatusHistoryEntry
    History,
    /// Vote: `v:{record}{user}` -> Vote
    Vote,
    /// Delivery entry: `n:{record}{notification}` -> Notification
    Notification,
}

impl KeyPrefix {
    /// Every child prefix that must go when a record is deleted.
    pub const CHILDREN: [KeyPrefix; 3] =
        [KeyPrefix::History, KeyPrefix::Vote, KeyPrefix::Notification];

    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Record => b"r:",
            KeyPrefix::History => b"h:",
            KeyPrefix::Vote => b"v:",
            KeyPrefix::Notification => b"n:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    /// Prefix covering every row of this type owned by `record`.
    pub fn for_record(&self, record: &RecordId) -> Vec<u8> {
        self.key(record.as_bytes())
    }

    pub fn record_key(id: &RecordId) -> Vec<u8> {
        KeyPrefix::Record.key(id.as_bytes())
    }

    /// Big-endian sequence keeps audit entries in append order under scans.
    pub fn history_key(record: &RecordId, sequence: u32) -> Vec<u8> {
        let mut key = KeyPrefix::History.for_record(record);
        key.extend_from_slice(&sequence.to_be_bytes());
        key
    }

    pub fn vote_key(record: &RecordId, user: &UserId) -> Vec<u8> {
        let mut key = KeyPrefix::Vote.for_record(record);
        key.extend_from_slice(user.as_bytes());
        key
    }

    pub fn notification_key(record: &RecordId, id: &NotificationId) -> Vec<u8> {
        let mut key = KeyPrefix::Notification.for_record(record);
        key.extend_from_slice(id.as_bytes());
        key
    }
}
