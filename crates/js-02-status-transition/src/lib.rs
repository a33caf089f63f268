//! # Status Transition Engine (js-02)
//!
//! Enforces the record lifecycle, writes the audit trail and emits the
//! transition events the notification dispatcher consumes.
//!
//! ## Lifecycle
//!
//! | From | To | Actor | Needs |
//! |------|----|-------|-------|
//! | draft | under-investigation | admin / system | - |
//! | draft | rejected | admin | reason |
//! | under-investigation | resolved | admin | resolution notes |
//! | under-investigation | rejected | admin | reason |
//! | under-investigation | under-investigation | admin | a different assignee |
//!
//! `resolved` and `rejected` are terminal. Citizens may edit or delete their
//! own records only while they are drafts.
//!
//! ## Guarantees
//!
//! - Requests for the same record are serialized; other records proceed
//!   independently.
//! - Status and audit entry are written in one atomic batch.
//! - The event is queued only after that batch commits; callers never wait
//!   for notification delivery.
//!
//! ## Crate Structure
//!
//! - `domain/` - lifecycle table, request types, errors
//! - `ports/` - `TransitionApi`
//! - `service.rs` - `TransitionEngine`
//! - `locks.rs` - per-record mutual exclusion
//! - `metrics.rs` - Prometheus counters (feature `metrics`)

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod locks;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::{
    is_allowed, replay, DraftChanges, NewRecord, PathViolation, ReasonRequirement,
    TransitionError, TransitionKind, TransitionRequest, TransitionResult,
};
pub use locks::RecordLocks;
pub use ports::inbound::TransitionApi;
pub use service::{TransitionConfig, TransitionEngine};
