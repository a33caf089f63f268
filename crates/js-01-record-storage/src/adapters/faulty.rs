//! Fault-injecting store wrapper.
//!
//! Used to exercise the storage-unavailable paths of the services above the
//! ledger. Switches are shared handles so they stay reachable after the
//! store has been moved into a ledger.

use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared on/off switches for injected faults.
#[derive(Debug, Clone, Default)]
pub struct FaultSwitch {
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    /// Writes still allowed before every write fails; `None` is unlimited.
    write_budget: Arc<Mutex<Option<usize>>>,
}

impl FaultSwitch {
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    /// Also clears any budget set by [`FaultSwitch::fail_writes_after`].
    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
        *self.write_budget.lock() = None;
    }

    /// Let `writes` more writes through, then fail every write.
    pub fn fail_writes_after(&self, writes: usize) {
        *self.write_budget.lock() = Some(writes);
    }

    fn check_read(&self, operation: &'static str) -> Result<(), KVStoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KVStoreError::Injected { operation });
        }
        Ok(())
    }

    fn check_write(&self, operation: &'static str) -> Result<(), KVStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KVStoreError::Injected { operation });
        }
        match self.write_budget.lock().as_mut() {
            Some(0) => Err(KVStoreError::Injected { operation }),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Wraps another store and fails on demand.
pub struct FaultyKVStore<KV> {
    inner: KV,
    switch: FaultSwitch,
}

impl<KV: KeyValueStore> FaultyKVStore<KV> {
    pub fn new(inner: KV) -> (Self, FaultSwitch) {
        let switch = FaultSwitch::default();
        (
            Self {
                inner,
                switch: switch.clone(),
            },
            switch,
        )
    }
}

impl<KV: KeyValueStore> KeyValueStore for FaultyKVStore<KV> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.switch.check_read("get")?;
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.switch.check_write("put")?;
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.switch.check_write("delete")?;
        self.inner.delete(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.switch.check_write("atomic_batch_write")?;
        self.inner.atomic_batch_write(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.switch.check_read("exists")?;
        self.inner.exists(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.switch.check_read("prefix_scan")?;
        self.inner.prefix_scan(prefix)
    }

    fn range_scan(
        &self,
        prefix: &[u8],
        start: &[u8],
        limit: usize,
    ) -> Result<ScanResult, KVStoreError> {
        self.switch.check_read("range_scan")?;
        self.inner.range_scan(prefix, start, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryKVStore;

    #[test]
    fn test_failed_batch_applies_nothing() {
        let (mut store, switch) = FaultyKVStore::new(InMemoryKVStore::new());
        switch.fail_writes(true);

        let err = store
            .atomic_batch_write(vec![BatchOperation::put(b"k".to_vec(), b"v".to_vec())])
            .unwrap_err();
        assert_eq!(
            err,
            KVStoreError::Injected {
                operation: "atomic_batch_write"
            }
        );

        switch.fail_writes(false);
        assert_eq!(store.get(b"k").unwrap(), None);
    }

    #[test]
    fn test_write_budget_runs_out() {
        let (mut store, switch) = FaultyKVStore::new(InMemoryKVStore::new());
        switch.fail_writes_after(2);

        store.put(b"a", b"1").unwrap();
        store.delete(b"a").unwrap();
        assert!(store.put(b"b", b"2").is_err());
        // Reads are unaffected.
        assert_eq!(store.get(b"b").unwrap(), None);

        switch.fail_writes(false);
        store.put(b"b", b"2").unwrap();
    }
}
