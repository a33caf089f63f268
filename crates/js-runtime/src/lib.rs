//! # Jiseti Runtime
//!
//! Explicit construction and teardown of the case core.
//!
//! ## Modular Structure
//!
//! - `container/` - `RuntimeConfig` and the `CaseService` container
//! - `adapters/` - storage backend selection, log-only channel adapters
//!
//! ## Flow
//!
//! ```text
//! admin action ──→ TransitionEngine ──(status + audit, atomic)──→ KvLedger
//!                        │
//!                        └─ TransitionEvent ──→ event queue ──→ DispatchWorker
//!                                                                   │
//!                                          NotificationDispatcher ←─┘
//!                                                   │
//!                                  email / SMS adapters ──→ delivery log
//! ```

pub mod adapters;
pub mod container;

pub use adapters::{LogChannel, StorageBackend};
pub use container::{
    CaseService, ConfigError, ContainerError, Ledger, RuntimeConfig, StorageBackendKind,
    StorageConfig,
};
