//! Port definitions for hexagonal architecture.

pub mod inbound;
