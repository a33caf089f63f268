//! Transition Engine - lifecycle business logic
//!
//! Every mutation of a record runs under that record's lock, so concurrent
//! requests for one record observe each other's results in order. The
//! status update and its audit entry go to storage as one atomic batch;
//! only after that commit is the event queued for dispatch. Queueing never
//! waits on the dispatcher.
//!
//! Votes do not take the record lock. The ledger writes only the fields an
//! operation owns onto a fresh read of the row, so a vote landing between
//! `load` and the write is never erased.

use crate::domain::{
    DraftChanges, NewRecord, ReasonRequirement, TransitionError, TransitionKind,
    TransitionRequest, TransitionResult,
};
use crate::locks::RecordLocks;
use crate::metrics;
use crate::ports::inbound::TransitionApi;
use async_trait::async_trait;
use js_01_record_storage::{AuditLog, History, RecordRepository, StatusDistribution};
use shared_bus::EventPublisher;
use shared_types::{
    Actor, AdminId, EventId, Record, RecordId, RecordStatus, StatusHistoryEntry, TimeSource,
    TransitionEvent,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Transition engine configuration
#[derive(Clone, Debug)]
pub struct TransitionConfig {
    /// Queue depth towards the dispatcher above which a backlog is reported
    pub event_queue_capacity: usize,
    /// Audit entries fetched per page by history iterators
    pub history_page_size: usize,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            event_queue_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
            history_page_size: js_01_record_storage::DEFAULT_HISTORY_PAGE,
        }
    }
}

/// Validates and applies lifecycle changes.
pub struct TransitionEngine<R, P: ?Sized> {
    repo: Arc<R>,
    publisher: Arc<P>,
    time: Arc<dyn TimeSource>,
    locks: RecordLocks,
    config: TransitionConfig,
}

impl<R, P> TransitionEngine<R, P>
where
    R: RecordRepository + AuditLog,
    P: EventPublisher + ?Sized,
{
    pub fn new(
        repo: Arc<R>,
        publisher: Arc<P>,
        time: Arc<dyn TimeSource>,
        config: TransitionConfig,
    ) -> Self {
        Self {
            repo,
            publisher,
            time,
            locks: RecordLocks::new(),
            config,
        }
    }

    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    fn load(&self, record_id: RecordId) -> TransitionResult<Record> {
        self.repo
            .get_record(&record_id)?
            .ok_or(TransitionError::RecordNotFound { record_id })
    }

    async fn apply_request(&self, request: TransitionRequest) -> TransitionResult<TransitionEvent> {
        if !request.actor.is_privileged() {
            return Err(TransitionError::Forbidden {
                action: "change record status",
            });
        }
        let _guard = self.locks.lock(request.record_id).await;
        let record = self.load(request.record_id)?;
        let reason = request.trimmed_reason();
        let (_, event) = self
            .transition_locked(
                record,
                request.target,
                request.actor,
                reason,
                request.assignee,
            )
            .await?;
        Ok(event)
    }

    /// Apply one edge to a record whose lock the caller holds.
    async fn transition_locked(
        &self,
        mut record: Record,
        target: RecordStatus,
        actor: Actor,
        reason: Option<String>,
        assignee: Option<AdminId>,
    ) -> TransitionResult<(Record, TransitionEvent)> {
        let from = record.status;
        let invalid = TransitionError::InvalidTransition { from, to: target };
        let kind = TransitionKind::classify(from, target).ok_or(invalid.clone())?;

        match (kind.requirement(), &reason) {
            (ReasonRequirement::Reason, None) => {
                return Err(TransitionError::MissingReason {
                    to: target,
                    what: "a reason",
                })
            }
            (ReasonRequirement::ResolutionNotes, None) => {
                return Err(TransitionError::MissingReason {
                    to: target,
                    what: "resolution notes",
                })
            }
            _ => {}
        }

        match kind {
            TransitionKind::Triage => {
                record.assigned_admin = assignee
                    .or(record.assigned_admin)
                    .or_else(|| actor.admin_id());
            }
            TransitionKind::Reassign => match assignee {
                Some(admin) if record.assigned_admin != Some(admin) => {
                    record.assigned_admin = Some(admin);
                }
                _ => return Err(invalid),
            },
            TransitionKind::Resolve => record.resolution_notes = reason.clone(),
            TransitionKind::Dismiss | TransitionKind::Reject => {}
        }

        // Never let the clock run backwards within one record's history.
        let timestamp = self.time.now().max(record.updated_at);
        let entry = StatusHistoryEntry {
            record_id: record.id,
            sequence: self.repo.next_sequence(&record.id)?,
            old_status: from,
            new_status: target,
            actor: actor.admin_id(),
            reason: reason.clone(),
            timestamp,
        };
        record.status = target;
        record.updated_at = timestamp;

        // The ledger re-reads the row, so votes cast since `load` are kept.
        let record = self.repo.commit_transition(&record, &entry)?;

        let event = TransitionEvent {
            event_id: EventId::new(),
            record_id: record.id,
            old_status: from,
            new_status: target,
            actor: entry.actor,
            reason,
            timestamp,
        };
        info!(
            record_id = %record.id,
            event_id = %event.event_id,
            from = %from,
            to = %target,
            kind = kind.as_str(),
            sequence = entry.sequence,
            "Transition applied"
        );
        metrics::record_transition_applied(kind.as_str());

        if let Err(e) = self.publisher.publish(event.clone()).await {
            error!(
                record_id = %record.id,
                event_id = %event.event_id,
                error = %e,
                "Transition committed but its event could not be queued"
            );
            metrics::record_event_unpublished();
        }
        Ok((record, event))
    }
}

#[async_trait]
impl<R, P> TransitionApi for TransitionEngine<R, P>
where
    R: RecordRepository + AuditLog + 'static,
    P: EventPublisher + ?Sized + 'static,
{
    type Log = R;

    #[instrument(skip(self, request), fields(record_id = %request.record_id, target = %request.target))]
    async fn request_transition(
        &self,
        request: TransitionRequest,
    ) -> TransitionResult<TransitionEvent> {
        let result = self.apply_request(request).await;
        if let Err(e) = &result {
            debug!(error = %e, "Transition refused");
            metrics::record_transition_rejected(e.label());
        }
        result
    }

    async fn submit_record(
        &self,
        submission: NewRecord,
        actor: Actor,
    ) -> TransitionResult<Record> {
        let Actor::Citizen(user) = actor else {
            return Err(TransitionError::Forbidden {
                action: "submit a record without a citizen account",
            });
        };
        let record = submission.into_draft(Some(user), self.time.now());
        self.repo.put_record(&record)?;
        info!(record_id = %record.id, kind = record.kind.as_str(), "Record submitted");
        metrics::record_submitted("citizen");
        Ok(record)
    }

    async fn submit_anonymous(
        &self,
        submission: NewRecord,
    ) -> TransitionResult<(Record, TransitionEvent)> {
        let record = submission.into_draft(None, self.time.now());
        let _guard = self.locks.lock(record.id).await;
        self.repo.put_record(&record)?;
        metrics::record_submitted("anonymous");
        info!(record_id = %record.id, "Anonymous record submitted");

        self.transition_locked(
            record,
            RecordStatus::UnderInvestigation,
            Actor::System,
            None,
            None,
        )
        .await
    }

    async fn update_draft(
        &self,
        record_id: RecordId,
        actor: Actor,
        changes: DraftChanges,
    ) -> TransitionResult<Record> {
        let _guard = self.locks.lock(record_id).await;
        let mut record = self.load(record_id)?;

        match actor {
            Actor::Citizen(user) if record.creator == Some(user) => {}
            _ => {
                return Err(TransitionError::Forbidden {
                    action: "edit a record you did not submit",
                })
            }
        }
        if record.status != RecordStatus::Draft {
            return Err(TransitionError::NotDraft {
                record_id,
                status: record.status,
            });
        }

        changes.apply(&mut record);
        record.updated_at = self.time.now().max(record.updated_at);
        let stored = self
            .repo
            .update_draft_fields(&record)?
            .ok_or(TransitionError::RecordNotFound { record_id })?;
        debug!(record_id = %record_id, "Draft updated");
        Ok(stored)
    }

    async fn delete_record(&self, record_id: RecordId, actor: Actor) -> TransitionResult<Record> {
        let _guard = self.locks.lock(record_id).await;
        let record = self.load(record_id)?;

        match actor {
            privileged if privileged.is_privileged() => {}
            Actor::Citizen(user) if record.creator == Some(user) => {
                if record.status != RecordStatus::Draft {
                    return Err(TransitionError::NotDraft {
                        record_id,
                        status: record.status,
                    });
                }
            }
            _ => {
                return Err(TransitionError::Forbidden {
                    action: "delete a record you did not submit",
                })
            }
        }

        let removed = self
            .repo
            .delete_record(&record_id)?
            .ok_or(TransitionError::RecordNotFound { record_id })?;
        info!(record_id = %record_id, status = %removed.status, "Record deleted");
        metrics::record_deleted();
        Ok(removed)
    }

    fn get_record(&self, record_id: RecordId) -> TransitionResult<Record> {
        self.load(record_id)
    }

    fn history(&self, record_id: RecordId) -> History<R> {
        History::new(self.repo.clone(), record_id).with_page_size(self.config.history_page_size)
    }

    fn status_distribution(&self) -> TransitionResult<StatusDistribution> {
        Ok(self.repo.status_distribution()?)
    }
}
