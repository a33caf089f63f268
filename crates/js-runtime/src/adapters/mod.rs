//! Runtime adapters: storage backend selection and log-only channels.

pub mod channels;
pub mod storage;

pub use channels::LogChannel;
pub use storage::StorageBackend;
