//! # Inbound Ports (Driving Ports)
//!
//! The API the rest of the application uses to move records through their
//! lifecycle.

use crate::domain::{DraftChanges, NewRecord, TransitionRequest, TransitionResult};
use async_trait::async_trait;
use js_01_record_storage::{AuditLog, History, StatusDistribution};
use shared_types::{Actor, Record, RecordId, TransitionEvent};

/// Transition engine API.
#[async_trait]
pub trait TransitionApi: Send + Sync {
    /// Audit log backing [`TransitionApi::history`].
    type Log: AuditLog + ?Sized;

    /// Validate and apply a status change.
    ///
    /// Returns once the record and its audit entry are durably written and
    /// the event is queued for dispatch. Never waits for delivery.
    async fn request_transition(
        &self,
        request: TransitionRequest,
    ) -> TransitionResult<TransitionEvent>;

    /// Create a `draft` record owned by a citizen.
    async fn submit_record(&self, submission: NewRecord, actor: Actor)
        -> TransitionResult<Record>;

    /// Create an anonymous record and triage it straight to investigation.
    async fn submit_anonymous(
        &self,
        submission: NewRecord,
    ) -> TransitionResult<(Record, TransitionEvent)>;

    /// Edit a draft. Creator only, `draft` only.
    async fn update_draft(
        &self,
        record_id: RecordId,
        actor: Actor,
        changes: DraftChanges,
    ) -> TransitionResult<Record>;

    /// Delete a record and everything it owns.
    ///
    /// The creator may delete while in `draft`; administrators at any time.
    async fn delete_record(&self, record_id: RecordId, actor: Actor) -> TransitionResult<Record>;

    fn get_record(&self, record_id: RecordId) -> TransitionResult<Record>;

    /// Lazy, restartable audit trail of a record.
    fn history(&self, record_id: RecordId) -> History<Self::Log>;

    fn status_distribution(&self) -> TransitionResult<StatusDistribution>;
}
