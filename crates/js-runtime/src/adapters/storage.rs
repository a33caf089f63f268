//! # Storage Backend
//!
//! Runtime-selected key-value backend behind the record ledger.

use crate::container::config::{StorageBackendKind, StorageConfig};
use js_01_record_storage::{
    BatchOperation, InMemoryKVStore, KVStoreError, KeyValueStore, ScanResult,
};
#[cfg(feature = "rocksdb")]
use js_01_record_storage::{RocksDbConfig, RocksDbStore};
use tracing::info;

pub enum StorageBackend {
    Memory(InMemoryKVStore),
    #[cfg(feature = "rocksdb")]
    RocksDb(RocksDbStore),
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            StorageBackend::Memory($store) => $call,
            #[cfg(feature = "rocksdb")]
            StorageBackend::RocksDb($store) => $call,
        }
    };
}

impl StorageBackend {
    /// Open the configured backend.
    pub fn open(config: &StorageConfig) -> Result<Self, KVStoreError> {
        match config.backend {
            StorageBackendKind::Memory => {
                info!("Using in-memory storage; data is lost on exit");
                Ok(Self::Memory(InMemoryKVStore::new()))
            }
            #[cfg(feature = "rocksdb")]
            StorageBackendKind::RocksDb => {
                let path = config.data_dir.to_string_lossy().into_owned();
                info!(path = %path, "Opening RocksDB storage");
                let store = RocksDbStore::open(RocksDbConfig {
                    path,
                    ..RocksDbConfig::default()
                })?;
                Ok(Self::RocksDb(store))
            }
            #[cfg(not(feature = "rocksdb"))]
            StorageBackendKind::RocksDb => Err(KVStoreError::IOError {
                message: "built without the rocksdb feature".into(),
            }),
        }
    }

    pub fn kind(&self) -> StorageBackendKind {
        match self {
            Self::Memory(_) => StorageBackendKind::Memory,
            #[cfg(feature = "rocksdb")]
            Self::RocksDb(_) => StorageBackendKind::RocksDb,
        }
    }
}

impl KeyValueStore for StorageBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        delegate!(self, s => s.get(key))
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        delegate!(self, s => s.put(key, value))
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        delegate!(self, s => s.delete(key))
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        delegate!(self, s => s.atomic_batch_write(operations))
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        delegate!(self, s => s.exists(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        delegate!(self, s => s.prefix_scan(prefix))
    }

    fn range_scan(
        &self,
        prefix: &[u8],
        start: &[u8],
        limit: usize,
    ) -> Result<ScanResult, KVStoreError> {
        delegate!(self, s => s.range_scan(prefix, start, limit))
    }
}
