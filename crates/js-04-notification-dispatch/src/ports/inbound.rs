//! # Inbound Ports (Driving Ports)

use crate::domain::{DispatchReport, DispatchResult};
use async_trait::async_trait;
use shared_types::{Notification, RecordId, TransitionEvent};

/// Notification dispatch API, driven by the dispatch worker.
#[async_trait]
pub trait DispatchApi: Send + Sync {
    /// Turn one transition event into delivery entries and drive each to a
    /// terminal state.
    ///
    /// Errors only when storage fails before any entry was queued; delivery
    /// failures are recorded on the entries, never returned.
    async fn dispatch(&self, event: &TransitionEvent) -> DispatchResult<DispatchReport>;

    /// Retry every failed entry of a record that has not been retried yet.
    async fn redeliver_failed(&self, record_id: RecordId) -> DispatchResult<DispatchReport>;

    /// Delivery log of a record, oldest first.
    fn delivery_log(&self, record_id: RecordId) -> DispatchResult<Vec<Notification>>;
}
