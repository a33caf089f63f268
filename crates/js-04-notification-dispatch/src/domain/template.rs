//! # Message Templates
//!
//! One template per modeled transition plus a generic fallback. Rendering is
//! a pure function of the record, the event, the audience and the channel,
//! so redelivering a stored message reproduces exactly what was first sent.
//!
//! | Key | Transition |
//! |-----|------------|
//! | `Triaged` | draft → under-investigation |
//! | `Dismissed` | draft → rejected |
//! | `Resolved` | under-investigation → resolved |
//! | `Rejected` | under-investigation → rejected |
//! | `Reassigned` | under-investigation → under-investigation |
//! | `Generic` | anything else |

use serde::{Deserialize, Serialize};
use shared_types::{NotificationChannel, Record, RecordStatus, TransitionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKey {
    Triaged,
    Dismissed,
    Resolved,
    Rejected,
    Reassigned,
    Generic,
}

impl TemplateKey {
    pub fn for_transition(old: RecordStatus, new: RecordStatus) -> Self {
        use RecordStatus::*;
        match (old, new) {
            (Draft, UnderInvestigation) => Self::Triaged,
            (Draft, Rejected) => Self::Dismissed,
            (UnderInvestigation, Resolved) => Self::Resolved,
            (UnderInvestigation, Rejected) => Self::Rejected,
            (UnderInvestigation, UnderInvestigation) => Self::Reassigned,
            _ => Self::Generic,
        }
    }

    fn summary(&self) -> Option<&'static str> {
        match self {
            Self::Triaged => Some("An administrator has started investigating it."),
            Self::Dismissed => Some("It was reviewed and will not be taken forward."),
            Self::Resolved => Some("The investigation is complete and the matter is resolved."),
            Self::Rejected => Some("The investigation was closed without further action."),
            Self::Reassigned => Some("It has been handed to a different investigator."),
            Self::Generic => None,
        }
    }
}

/// Who a message is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Audience {
    /// The citizen who filed the report.
    Reporter,
    /// The administrator assigned to an urgent record.
    AssignedAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    /// Email only.
    pub subject: Option<String>,
    pub body: String,
}

fn shout(status: RecordStatus) -> String {
    status.as_str().to_uppercase()
}

/// Render the message for one recipient on one channel.
pub fn render(
    channel: NotificationChannel,
    audience: Audience,
    recipient_name: &str,
    record: &Record,
    event: &TransitionEvent,
) -> RenderedMessage {
    match channel {
        NotificationChannel::Sms => RenderedMessage {
            subject: None,
            body: render_sms(audience, record, event),
        },
        // `Both` never reaches a stored entry; render it as email.
        NotificationChannel::Email | NotificationChannel::Both => RenderedMessage {
            subject: Some(format!("Status Update: {}", record.title)),
            body: render_email(audience, recipient_name, record, event),
        },
    }
}

fn render_email(
    audience: Audience,
    recipient_name: &str,
    record: &Record,
    event: &TransitionEvent,
) -> String {
    let key = TemplateKey::for_transition(event.old_status, event.new_status);
    let mut body = format!("Hello {recipient_name},\n\n");
    match audience {
        Audience::Reporter => {
            body.push_str(&format!("Your record \"{}\" has been updated.", record.title));
        }
        Audience::AssignedAdmin => {
            body.push_str(&format!(
                "The urgent record \"{}\" assigned to you has been updated.",
                record.title
            ));
        }
    }
    if let Some(summary) = key.summary() {
        body.push(' ');
        body.push_str(summary);
    }
    body.push_str(&format!(
        "\n\nStatus: {} \u{279D} {}",
        shout(event.old_status),
        shout(event.new_status)
    ));
    if let Some(reason) = &event.reason {
        body.push_str(&format!("\n\nReason: {reason}"));
    }
    if key == TemplateKey::Resolved {
        if let Some(notes) = &record.resolution_notes {
            body.push_str(&format!("\n\nResolution Notes: {notes}"));
        }
    }
    body.push_str("\n\nThank you for using Jiseti!\n\nBest regards,\nJiseti Admin Team");
    body
}

fn render_sms(audience: Audience, record: &Record, event: &TransitionEvent) -> String {
    match audience {
        Audience::Reporter => format!(
            "Jiseti Update: Your report '{}' is now {}. Check your email for details.",
            record.title,
            shout(event.new_status)
        ),
        Audience::AssignedAdmin => format!(
            "Jiseti Alert: Urgent report '{}' assigned to you is now {}.",
            record.title,
            shout(event.new_status)
        ),
    }
}
