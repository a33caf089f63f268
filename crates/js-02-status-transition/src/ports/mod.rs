//! Port definitions for hexagonal architecture.
//!
//! Outbound dependencies come from sibling crates: the repository ports of
//! `js-01-record-storage`, `EventPublisher` from `shared-bus` and
//! `TimeSource` from `shared-types`.

pub mod inbound;
