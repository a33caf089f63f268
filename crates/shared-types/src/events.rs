//! # Transition Events
//!
//! Output of a successful status change, handed from the transition engine
//! to the notification dispatcher through the shared bus.

use serde::{Deserialize, Serialize};

use crate::entities::{AdminId, EventId, RecordId, RecordStatus};
use crate::time::Timestamp;

/// A committed status change.
///
/// Emitted only after the status update and its audit entry are durable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub event_id: EventId,
    pub record_id: RecordId,
    pub old_status: RecordStatus,
    pub new_status: RecordStatus,
    /// `None` for internal automation.
    pub actor: Option<AdminId>,
    pub reason: Option<String>,
    pub timestamp: Timestamp,
}

impl TransitionEvent {
    /// `under-investigation → under-investigation`.
    #[must_use]
    pub fn is_reassignment(&self) -> bool {
        self.old_status == self.new_status
    }
}
