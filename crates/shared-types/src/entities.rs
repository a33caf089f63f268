//! # Core Domain Entities
//!
//! Defines the case entities shared by every Jiseti subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `RecordId`, `UserId`, `AdminId`, `NotificationId`, `EventId`, `Actor`
//! - **Records**: `Record`, `RecordKind`, `RecordStatus`, `UrgencyLevel`, `Location`
//! - **Audit**: `StatusHistoryEntry`
//! - **Votes**: `Vote`, `VoteKind`
//! - **Notifications**: `Notification`, `NotificationChannel`, `DeliveryStatus`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ParseEnumError;
use crate::time::Timestamp;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Raw 16-byte form, used for storage keys.
            #[must_use]
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a submitted record (red-flag or intervention report).
    RecordId
);
uuid_id!(
    /// Identifier of a citizen account.
    UserId
);
uuid_id!(
    /// Identifier of an administrator account.
    AdminId
);
uuid_id!(
    /// Identifier of a single notification delivery entry.
    NotificationId
);
uuid_id!(
    /// Identifier of a transition event; links every delivery attempt it causes.
    EventId
);

/// Authenticated identity supplied by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// A citizen account.
    Citizen(UserId),
    /// An administrator account.
    Admin(AdminId),
    /// Internal automation (anonymous intake triage).
    System,
}

impl Actor {
    /// Administrator identity, if the actor is one.
    #[must_use]
    pub fn admin_id(&self) -> Option<AdminId> {
        match self {
            Self::Admin(id) => Some(*id),
            _ => None,
        }
    }

    /// True for administrators and internal automation.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin(_) | Self::System)
    }
}

// =============================================================================
// CLUSTER B: RECORDS
// =============================================================================

/// Kind of report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    RedFlag,
    Intervention,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::RedFlag, RecordKind::Intervention];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RedFlag => "red-flag",
            Self::Intervention => "intervention",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("record kind", s))
    }
}

/// Lifecycle status of a record.
///
/// ```text
/// [DRAFT] ──triage──→ [UNDER-INVESTIGATION] ──notes──→ [RESOLVED]
///    │                     │      ↑ reassign
///    │                     └──────┘
///    │                     │
///    └──reason──→ [REJECTED] ←──reason──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecordStatus {
    #[default]
    Draft,
    UnderInvestigation,
    Resolved,
    Rejected,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 4] = [
        RecordStatus::Draft,
        RecordStatus::UnderInvestigation,
        RecordStatus::Resolved,
        RecordStatus::Rejected,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::UnderInvestigation => "under-investigation",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// No transition leaves a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("record status", s))
    }
}

/// Urgency assigned at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    /// High and critical records escalate to the assigned administrator.
    #[must_use]
    pub fn is_escalated(&self) -> bool {
        *self >= Self::High
    }
}

/// Where the reported incident happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub name: Option<String>,
}

/// A submitted red-flag or intervention report.
///
/// Owned by the record store. `status` only changes through the transition
/// engine; `vote_count` only changes together with a vote row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    pub status: RecordStatus,
    pub location: Location,
    pub urgency: UrgencyLevel,
    /// `None` for anonymous reports.
    pub creator: Option<UserId>,
    pub assigned_admin: Option<AdminId>,
    pub resolution_notes: Option<String>,
    pub vote_count: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Record {
    /// Build a fresh draft record.
    #[must_use]
    pub fn draft(
        kind: RecordKind,
        title: impl Into<String>,
        description: impl Into<String>,
        creator: Option<UserId>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: RecordId::new(),
            kind,
            title: title.into(),
            description: description.into(),
            status: RecordStatus::Draft,
            location: Location::default(),
            urgency: UrgencyLevel::default(),
            creator,
            assigned_admin: None,
            resolution_notes: None,
            vote_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.creator.is_none()
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
}

// =============================================================================
// CLUSTER C: AUDIT
// =============================================================================

/// One immutable status change.
///
/// `sequence` starts at 0 for the first change of a record and increases by
/// one per entry, so a record's history has no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub record_id: RecordId,
    pub sequence: u32,
    pub old_status: RecordStatus,
    pub new_status: RecordStatus,
    /// `None` when the change was made by internal automation.
    pub actor: Option<AdminId>,
    pub reason: Option<String>,
    pub timestamp: Timestamp,
}

// =============================================================================
// CLUSTER D: VOTES
// =============================================================================

/// Kind of citizen vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    #[default]
    Support,
    Urgent,
}

impl VoteKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for VoteKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "support" => Ok(Self::Support),
            "urgent" => Ok(Self::Urgent),
            other => Err(ParseEnumError::new("vote kind", other)),
        }
    }
}

/// At most one per (record, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub record_id: RecordId,
    pub user_id: UserId,
    pub kind: VoteKind,
    pub timestamp: Timestamp,
}

// =============================================================================
// CLUSTER E: NOTIFICATIONS
// =============================================================================

/// Delivery medium.
///
/// `Both` only appears as a contact preference; stored entries always name a
/// concrete channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    #[default]
    Email,
    Sms,
    Both,
}

impl NotificationChannel {
    /// Concrete channels covered by this preference.
    #[must_use]
    pub fn expand(&self) -> &'static [NotificationChannel] {
        match self {
            Self::Email => &[NotificationChannel::Email],
            Self::Sms => &[NotificationChannel::Sms],
            Self::Both => &[NotificationChannel::Email, NotificationChannel::Sms],
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery state of one notification entry.
///
/// ```text
/// [PENDING] ──provider ack──→ [SENT]
///     │
///     └──permanent / exhausted──→ [FAILED]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    Citizen(UserId),
    Admin(AdminId),
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Citizen(id) => write!(f, "citizen:{id}"),
            Self::Admin(id) => write!(f, "admin:{id}"),
        }
    }
}

/// One delivery entry for a recipient × channel pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub event_id: EventId,
    pub record_id: RecordId,
    pub recipient: Recipient,
    pub channel: NotificationChannel,
    pub subject: Option<String>,
    pub message: String,
    pub status: DeliveryStatus,
    /// Provider-assigned identifier once sent.
    pub external_id: Option<String>,
    /// Provider attempts made for this entry.
    pub attempts: u8,
    /// Failure description once failed.
    pub error: Option<String>,
    /// Entry this one re-delivers, if any.
    pub retry_of: Option<NotificationId>,
    pub created_at: Timestamp,
    pub sent_at: Option<Timestamp>,
}

impl Notification {
    /// Mark sent. Only a pending entry can settle.
    pub fn mark_sent(
        &mut self,
        external_id: String,
        attempts: u8,
        now: Timestamp,
    ) -> Result<(), DeliveryStatus> {
        if self.status != DeliveryStatus::Pending {
            return Err(self.status);
        }
        self.status = DeliveryStatus::Sent;
        self.external_id = Some(external_id);
        self.attempts = attempts;
        self.sent_at = Some(now);
        Ok(())
    }

    /// Mark failed. Only a pending entry can settle.
    pub fn mark_failed(&mut self, error: String, attempts: u8) -> Result<(), DeliveryStatus> {
        if self.status != DeliveryStatus::Pending {
            return Err(self.status);
        }
        self.status = DeliveryStatus::Failed;
        self.error = Some(error);
        self.attempts = attempts;
        Ok(())
    }
}
