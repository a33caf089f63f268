//! Per-record mutual exclusion.
//!
//! Requests for the same record queue on one async mutex; requests for
//! different records never contend beyond a brief map lookup. Entries are
//! pruned once no task holds or waits on them.

use parking_lot::Mutex;
use shared_types::RecordId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct RecordLocks {
    slots: Mutex<HashMap<RecordId, Arc<AsyncMutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `record_id`.
    pub async fn lock(&self, record_id: RecordId) -> RecordGuard<'_> {
        let slot = self.slots.lock().entry(record_id).or_default().clone();
        let guard = slot.lock_owned().await;
        RecordGuard {
            locks: self,
            record_id,
            guard: Some(guard),
        }
    }

    /// Number of records currently locked or awaited.
    pub fn active(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Held while a record is being mutated.
pub struct RecordGuard<'a> {
    locks: &'a RecordLocks,
    record_id: RecordId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut slots = self.locks.slots.lock();
        // Only the map's own reference left: nobody holds or waits.
        if slots
            .get(&self.record_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.record_id);
        }
    }
}
