//! # Service Container
//!
//! Holds every subsystem instance with explicit construction and teardown.

pub mod config;
pub mod service;

pub use config::{ConfigError, RuntimeConfig, StorageBackendKind, StorageConfig};
pub use service::{CaseService, ContainerError, Ledger};
