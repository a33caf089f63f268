//! # Shared Types Crate
//!
//! This crate contains the case entities, the transition event, and the
//! storage error shared by every Jiseti subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Closed Variants**: status, vote kind, channel and delivery state are
//!   enums; there is no stringly-typed status anywhere in the core.
//! - **Plain Data**: entities carry no persistence behavior; repositories in
//!   `js-01-record-storage` own storage.

pub mod entities;
pub mod errors;
pub mod events;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use events::TransitionEvent;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
