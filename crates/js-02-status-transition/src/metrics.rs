//! # Transition Metrics
//!
//! Enable with the `metrics` feature:
//! ```toml
//! js-02-status-transition = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `jiseti_transitions_applied_total` - Applied transitions (by kind)
//! - `jiseti_transitions_rejected_total` - Refused requests (by reason)
//! - `jiseti_records_submitted_total` - New records (by intake)
//! - `jiseti_records_deleted_total` - Deleted records
//! - `jiseti_events_unpublished_total` - Committed transitions whose event could not be queued

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Applied transitions, labeled by kind
    pub static ref TRANSITIONS_APPLIED: IntCounterVec = register_int_counter_vec!(
        "jiseti_transitions_applied_total",
        "Total number of status transitions applied",
        &["kind"]
    )
    .expect("Failed to create TRANSITIONS_APPLIED metric");

    /// Refused transition requests, labeled by reason
    pub static ref TRANSITIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "jiseti_transitions_rejected_total",
        "Total number of status transition requests refused",
        &["reason"]
    )
    .expect("Failed to create TRANSITIONS_REJECTED metric");

    /// New records, labeled by intake
    pub static ref RECORDS_SUBMITTED: IntCounterVec = register_int_counter_vec!(
        "jiseti_records_submitted_total",
        "Total number of records submitted",
        &["intake"]
    )
    .expect("Failed to create RECORDS_SUBMITTED metric");

    /// Deleted records
    pub static ref RECORDS_DELETED: IntCounter = register_int_counter!(
        "jiseti_records_deleted_total",
        "Total number of records deleted"
    )
    .expect("Failed to create RECORDS_DELETED metric");

    /// Events lost to a closed queue
    pub static ref EVENTS_UNPUBLISHED: IntCounter = register_int_counter!(
        "jiseti_events_unpublished_total",
        "Committed transitions whose event could not be queued"
    )
    .expect("Failed to create EVENTS_UNPUBLISHED metric");
}

#[cfg(feature = "metrics")]
pub fn record_transition_applied(kind: &str) {
    TRANSITIONS_APPLIED.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_transition_rejected(reason: &str) {
    TRANSITIONS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_submitted(intake: &str) {
    RECORDS_SUBMITTED.with_label_values(&[intake]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_deleted() {
    RECORDS_DELETED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_event_unpublished() {
    EVENTS_UNPUBLISHED.inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_transition_applied(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_transition_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_submitted(_intake: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_deleted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_event_unpublished() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_never_panic() {
        record_transition_applied("triage");
        record_transition_rejected("invalid_transition");
        record_submitted("anonymous");
        record_deleted();
        record_event_unpublished();
    }
}
