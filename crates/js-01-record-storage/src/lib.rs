//! # Record Storage (js-01)
//!
//! Authoritative persistence for records, their status history, votes and
//! notification delivery log.
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Atomic Transitions | A status change and its audit entry are one batch |
//! | Append-Only History | A history slot, once written, never changes |
//! | Consistent Tallies | A vote row and the record's count move together |
//! | Settle Once | A delivery entry leaves `pending` exactly once |
//! | Cascading Delete | Deleting a record removes all of its child rows |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Key layout, row codec, history view, read models
//! - `ports/` - Repository traits (inbound) and the KV store SPI (outbound)
//! - `adapters/` - In-memory, fault-injecting and RocksDB stores
//! - `service.rs` - `KvLedger`, implementing every repository over one store
//!
//! ## Usage
//!
//! ```ignore
//! use js_01_record_storage::{KvLedger, RecordRepository};
//!
//! let ledger = KvLedger::in_memory();
//! ledger.put_record(&record)?;
//! let stored = ledger.get_record(&record.id)?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FaultSwitch, FaultyKVStore, InMemoryKVStore};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use domain::errors::KVStoreError;
pub use domain::history::{History, HistoryIter, DEFAULT_HISTORY_PAGE};
pub use domain::keys::KeyPrefix;
pub use domain::stats::StatusDistribution;
pub use ports::inbound::{
    AuditLog, NotificationRepository, RecordRepository, SettleOutcome, VoteRepository, VoteWrite,
};
pub use ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
pub use service::KvLedger;
