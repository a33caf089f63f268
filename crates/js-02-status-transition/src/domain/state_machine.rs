//! # Record Lifecycle State Machine
//!
//! ```text
//!            triage / assign                 resolve (notes)
//!   Draft ─────────────────▶ UnderInvestigation ──────────────▶ Resolved
//!     │                         │    ▲
//!     │ dismiss (reason)        │    │ reassign
//!     ▼                         │    │
//!  Rejected ◀───────────────────┘────┘
//!            reject (reason)
//! ```
//!
//! `Resolved` and `Rejected` are terminal.

use shared_types::{RecordStatus, StatusHistoryEntry};
use thiserror::Error;

/// A legal edge of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// `draft → under-investigation`
    Triage,
    /// `draft → rejected`
    Dismiss,
    /// `under-investigation → resolved`
    Resolve,
    /// `under-investigation → rejected`
    Reject,
    /// `under-investigation → under-investigation`
    Reassign,
}

/// What accompanying text a transition needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonRequirement {
    Optional,
    Reason,
    ResolutionNotes,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 5] = [
        TransitionKind::Triage,
        TransitionKind::Dismiss,
        TransitionKind::Resolve,
        TransitionKind::Reject,
        TransitionKind::Reassign,
    ];

    /// Classify a status pair. `None` means the pair is not in the table.
    pub fn classify(from: RecordStatus, to: RecordStatus) -> Option<Self> {
        use RecordStatus::*;
        match (from, to) {
            (Draft, UnderInvestigation) => Some(Self::Triage),
            (Draft, Rejected) => Some(Self::Dismiss),
            (UnderInvestigation, Resolved) => Some(Self::Resolve),
            (UnderInvestigation, Rejected) => Some(Self::Reject),
            (UnderInvestigation, UnderInvestigation) => Some(Self::Reassign),
            (Draft, Draft | Resolved) | (UnderInvestigation, Draft) | (Resolved | Rejected, _) => {
                None
            }
        }
    }

    pub fn endpoints(&self) -> (RecordStatus, RecordStatus) {
        use RecordStatus::*;
        match self {
            Self::Triage => (Draft, UnderInvestigation),
            Self::Dismiss => (Draft, Rejected),
            Self::Resolve => (UnderInvestigation, Resolved),
            Self::Reject => (UnderInvestigation, Rejected),
            Self::Reassign => (UnderInvestigation, UnderInvestigation),
        }
    }

    pub fn requirement(&self) -> ReasonRequirement {
        match self {
            Self::Triage | Self::Reassign => ReasonRequirement::Optional,
            Self::Dismiss | Self::Reject => ReasonRequirement::Reason,
            Self::Resolve => ReasonRequirement::ResolutionNotes,
        }
    }

    /// False only for re-assignment, which keeps the status.
    pub fn changes_status(&self) -> bool {
        !matches!(self, Self::Reassign)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Dismiss => "dismiss",
            Self::Resolve => "resolve",
            Self::Reject => "reject",
            Self::Reassign => "reassign",
        }
    }
}

/// Whether `(from, to)` is a legal edge.
pub fn is_allowed(from: RecordStatus, to: RecordStatus) -> bool {
    TransitionKind::classify(from, to).is_some()
}

/// Ways a stored history can fail to describe a lifecycle path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathViolation {
    #[error("expected sequence {expected}, found {found}")]
    Gap { expected: u32, found: u32 },

    #[error("entry {sequence} starts from {found} but the record was {expected}")]
    Discontinuous {
        sequence: u32,
        expected: RecordStatus,
        found: RecordStatus,
    },

    #[error("entry {sequence} records illegal edge {from} -> {to}")]
    IllegalEdge {
        sequence: u32,
        from: RecordStatus,
        to: RecordStatus,
    },

    #[error("entry {sequence} is older than its predecessor")]
    OutOfOrder { sequence: u32 },
}

/// Replay a history from `draft` and return the status it ends in.
pub fn replay<'a>(
    entries: impl IntoIterator<Item = &'a StatusHistoryEntry>,
) -> Result<RecordStatus, PathViolation> {
    let mut status = RecordStatus::Draft;
    let mut last_timestamp = 0;

    for (expected, entry) in (0u32..).zip(entries) {
        if entry.sequence != expected {
            return Err(PathViolation::Gap {
                expected,
                found: entry.sequence,
            });
        }
        if entry.old_status != status {
            return Err(PathViolation::Discontinuous {
                sequence: entry.sequence,
                expected: status,
                found: entry.old_status,
            });
        }
        if !is_allowed(entry.old_status, entry.new_status) {
            return Err(PathViolation::IllegalEdge {
                sequence: entry.sequence,
                from: entry.old_status,
                to: entry.new_status,
            });
        }
        if entry.timestamp < last_timestamp {
            return Err(PathViolation::OutOfOrder {
                sequence: entry.sequence,
            });
        }
        last_timestamp = entry.timestamp;
        status = entry.new_status;
    }
    Ok(status)
}
