//! # Notification Dispatch (js-04)
//!
//! Converts committed transition events into email / SMS deliveries and
//! tracks every delivery to a terminal state.
//!
//! ## Guarantees
//!
//! | Guarantee | Enforcement |
//! |-----------|-------------|
//! | One terminal entry per recipient × channel pair | entry inserted `pending`, retried in place, settled once |
//! | Transient failures retried, at most `max_attempts` calls | `RetryPolicy` with capped exponential backoff |
//! | Permanent failures never retried | `ChannelError::Permanent` ends the attempt loop |
//! | Exhausted deliveries are surfaced | `AlertSink::delivery_failed` |
//! | Deleted records get no new entries | `insert_notification` refuses orphans |
//! | Callers never wait for delivery | `DispatchWorker` drains the event queue in the background |
//!
//! ## Crate Structure
//!
//! - `domain/` - templates, contacts, recipient selection, retry policy
//! - `ports/` - `DispatchApi`; `ChannelAdapter`, `AlertSink`, `RecipientDirectory`
//! - `adapters/` - in-memory channel and directory, tracing alert sink
//! - `service.rs` - `NotificationDispatcher`
//! - `worker.rs` - `DispatchWorker`

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod worker;

pub use adapters::{MemoryChannel, StaticDirectory, TracingAlertSink};
pub use domain::{
    normalize_phone, render, Audience, ChannelError, Contact, DeliveryOutcome, DispatchError,
    DispatchReport, DispatchResult, RenderedMessage, RetryPolicy, SkipReason, TemplateKey,
};
pub use ports::inbound::DispatchApi;
pub use ports::outbound::{AlertSink, ChannelAdapter, FailureSummary, RecipientDirectory};
pub use service::{DispatchConfig, NotificationDispatcher};
pub use worker::{DispatchWorker, WorkerHandle, WorkerStats};
