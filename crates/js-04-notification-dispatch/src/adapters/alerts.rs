use crate::ports::outbound::{AlertSink, FailureSummary};
use shared_types::{Notification, StorageError};
use tracing::error;

/// Reports exhausted deliveries and unstored outcomes as `error!` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn delivery_failed(&self, failure: &FailureSummary) {
        error!(
            notification_id = %failure.notification_id,
            event_id = %failure.event_id,
            record_id = %failure.record_id,
            recipient = %failure.recipient,
            channel = %failure.channel,
            attempts = failure.attempts,
            error = %failure.error,
            "Notification delivery failed after retries"
        );
    }

    fn outcome_not_stored(&self, entry: &Notification, error: &StorageError) {
        error!(
            notification_id = %entry.id,
            record_id = %entry.record_id,
            channel = %entry.channel,
            status = ?entry.status,
            error = %error,
            "Delivery outcome not stored; entry left pending"
        );
    }
}
