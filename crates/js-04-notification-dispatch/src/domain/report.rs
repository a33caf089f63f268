//! Outcome of one dispatch run.

use serde::{Deserialize, Serialize};
use shared_types::{
    DeliveryStatus, EventId, NotificationChannel, NotificationId, Recipient, RecordId,
};

/// Why a dispatch created no entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Re-assignment events are configured not to notify.
    ReassignmentSuppressed,
    /// The record was deleted before its entries were queued.
    RecordDeleted,
    /// Anonymous record with nobody to escalate to.
    NoRecipients,
    /// Redelivery found no failed entry awaiting a retry.
    NothingToRedeliver,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReassignmentSuppressed => "reassignment_suppressed",
            Self::RecordDeleted => "record_deleted",
            Self::NoRecipients => "no_recipients",
            Self::NothingToRedeliver => "nothing_to_redeliver",
        }
    }
}

/// Terminal state of one recipient × channel entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub notification_id: NotificationId,
    pub recipient: Recipient,
    pub channel: NotificationChannel,
    pub status: DeliveryStatus,
    pub attempts: u8,
    /// False if the record vanished while the entry was in flight.
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub record_id: RecordId,
    /// `None` for redelivery runs, which may span several events.
    pub event_id: Option<EventId>,
    pub skipped: Option<SkipReason>,
    pub deliveries: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    pub(crate) fn new(record_id: RecordId, event_id: Option<EventId>) -> Self {
        Self {
            record_id,
            event_id,
            skipped: None,
            deliveries: Vec::new(),
        }
    }

    pub(crate) fn skip(mut self, reason: SkipReason) -> Self {
        self.skipped = Some(reason);
        self
    }

    pub fn sent(&self) -> usize {
        self.count(DeliveryStatus::Sent)
    }

    pub fn failed(&self) -> usize {
        self.count(DeliveryStatus::Failed)
    }

    fn count(&self, status: DeliveryStatus) -> usize {
        self.deliveries.iter().filter(|d| d.status == status).count()
    }
}
