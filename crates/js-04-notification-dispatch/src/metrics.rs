//! # Dispatch Metrics
//!
//! Enable with the `metrics` feature.
//!
//! ## Metrics Exported
//!
//! - `jiseti_notifications_sent_total` - Delivered entries (by channel)
//! - `jiseti_notifications_failed_total` - Failed entries (by channel)
//! - `jiseti_delivery_retries_total` - Transient failures retried (by channel)
//! - `jiseti_dispatch_skipped_total` - Dispatches that queued nothing (by reason)
//! - `jiseti_notifications_unqueued_total` - Pairs whose entry could not be stored
//! - `jiseti_notifications_unsettled_total` - Outcomes that could not be stored (by channel)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref NOTIFICATIONS_SENT: IntCounterVec = register_int_counter_vec!(
        "jiseti_notifications_sent_total",
        "Total number of notifications delivered",
        &["channel"]
    )
    .expect("Failed to create NOTIFICATIONS_SENT metric");

    pub static ref NOTIFICATIONS_FAILED: IntCounterVec = register_int_counter_vec!(
        "jiseti_notifications_failed_total",
        "Total number of notifications that ended failed",
        &["channel"]
    )
    .expect("Failed to create NOTIFICATIONS_FAILED metric");

    pub static ref DELIVERY_RETRIES: IntCounterVec = register_int_counter_vec!(
        "jiseti_delivery_retries_total",
        "Total number of delivery retries after transient failures",
        &["channel"]
    )
    .expect("Failed to create DELIVERY_RETRIES metric");

    pub static ref DISPATCH_SKIPPED: IntCounterVec = register_int_counter_vec!(
        "jiseti_dispatch_skipped_total",
        "Total number of dispatches that queued no notification",
        &["reason"]
    )
    .expect("Failed to create DISPATCH_SKIPPED metric");

    pub static ref NOTIFICATIONS_UNQUEUED: IntCounter = register_int_counter!(
        "jiseti_notifications_unqueued_total",
        "Total number of recipient-channel pairs whose entry could not be stored"
    )
    .expect("Failed to create NOTIFICATIONS_UNQUEUED metric");

    pub static ref NOTIFICATIONS_UNSETTLED: IntCounterVec = register_int_counter_vec!(
        "jiseti_notifications_unsettled_total",
        "Total number of delivery outcomes that could not be stored",
        &["channel"]
    )
    .expect("Failed to create NOTIFICATIONS_UNSETTLED metric");
}

#[cfg(feature = "metrics")]
pub fn record_notification_sent(channel: &str) {
    NOTIFICATIONS_SENT.with_label_values(&[channel]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_notification_failed(channel: &str) {
    NOTIFICATIONS_FAILED.with_label_values(&[channel]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_delivery_retry(channel: &str) {
    DELIVERY_RETRIES.with_label_values(&[channel]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_dispatch_skipped(reason: &str) {
    DISPATCH_SKIPPED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_notification_unqueued() {
    NOTIFICATIONS_UNQUEUED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_notification_unsettled(channel: &str) {
    NOTIFICATIONS_UNSETTLED.with_label_values(&[channel]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_notification_sent(_channel: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_notification_failed(_channel: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_delivery_retry(_channel: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_dispatch_skipped(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_notification_unqueued() {}

#[cfg(not(feature = "metrics"))]
pub fn record_notification_unsettled(_channel: &str) {}
