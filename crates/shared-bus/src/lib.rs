//! # Shared Bus - Transition Event Queue
//!
//! Hands committed transition events from the transition engine to the
//! notification dispatcher.
//!
//! ## Handoff
//!
//! ```text
//! ┌──────────────────┐                    ┌────────────────────┐
//! │ Transition       │    publish()       │ Notification       │
//! │ Engine           │ ──────┐            │ Dispatcher         │
//! └──────────────────┘       │            └────────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐           │
//!                      │  Event Queue │ ──────────┘
//!                      │ (unbounded)  │   recv()
//!                      └──────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **FIFO:** events are received in publish order.
//! - **Lossless:** nothing is dropped while the consumer is alive.
//! - **Non-blocking:** `publish` never waits on the consumer. A queue deeper
//!   than its capacity is logged as a backlog instead of stalling requests.
//! - **Single consumer:** the dispatcher worker owns the receiving side.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use publisher::{EventPublisher, InMemoryEventBus, PublishError};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Queue depth above which a backlog is reported.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
