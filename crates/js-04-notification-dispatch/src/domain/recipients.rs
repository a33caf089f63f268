//! Recipient selection.

use crate::domain::template::Audience;
use shared_types::{Recipient, Record};

/// Everyone a status change on `record` is addressed to.
///
/// The creator always hears about their own report; the assigned
/// administrator is added only while the record counts as urgent.
pub fn select_recipients(record: &Record, urgent: bool) -> Vec<(Recipient, Audience)> {
    let mut recipients = Vec::with_capacity(2);
    if let Some(creator) = record.creator {
        recipients.push((Recipient::Citizen(creator), Audience::Reporter));
    }
    if urgent {
        if let Some(admin) = record.assigned_admin {
            recipients.push((Recipient::Admin(admin), Audience::AssignedAdmin));
        }
    }
    recipients
}
