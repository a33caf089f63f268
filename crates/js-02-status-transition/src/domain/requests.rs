//! Request and input types accepted by the engine.

use serde::{Deserialize, Serialize};
use shared_types::{
    Actor, AdminId, Location, Record, RecordId, RecordKind, RecordStatus, Timestamp,
    UrgencyLevel, UserId,
};

/// An administrative status change.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub record_id: RecordId,
    pub target: RecordStatus,
    pub actor: Actor,
    /// Reason, or resolution notes when resolving.
    pub reason: Option<String>,
    /// Administrator to assign on triage or re-assignment.
    pub assignee: Option<AdminId>,
}

impl TransitionRequest {
    pub fn new(record_id: RecordId, target: RecordStatus, actor: Actor) -> Self {
        Self {
            record_id,
            target,
            actor,
            reason: None,
            assignee: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: AdminId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// The reason with surrounding whitespace removed; blank counts as absent.
    pub fn trimmed_reason(&self) -> Option<String> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

/// Fields of a new submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub urgency: UrgencyLevel,
}

impl NewRecord {
    pub fn new(kind: RecordKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            location: Location::default(),
            urgency: UrgencyLevel::default(),
        }
    }

    #[must_use]
    pub fn with_urgency(mut self, urgency: UrgencyLevel) -> Self {
        self.urgency = urgency;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub(crate) fn into_draft(self, creator: Option<UserId>, now: Timestamp) -> Record {
        Record::draft(self.kind, self.title, self.description, creator, now)
            .with_urgency(self.urgency)
            .with_location(self.location)
    }
}

/// Partial edit of a draft. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftChanges {
    pub kind: Option<RecordKind>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub urgency: Option<UrgencyLevel>,
}

impl DraftChanges {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.urgency.is_none()
    }

    pub(crate) fn apply(self, record: &mut Record) {
        if let Some(kind) = self.kind {
            record.kind = kind;
        }
        if let Some(title) = self.title {
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = description;
        }
        if let Some(location) = self.location {
            record.location = location;
        }
        if let Some(urgency) = self.urgency {
            record.urgency = urgency;
        }
    }
}
