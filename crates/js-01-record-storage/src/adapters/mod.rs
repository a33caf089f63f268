//! Key-value store adapters.

pub mod faulty;
pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;

pub use faulty::{FaultSwitch, FaultyKVStore};
pub use memory::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbStore};
