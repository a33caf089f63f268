//! # Outbound Ports (Driven Ports)
//!
//! External collaborators of the dispatcher: the email / SMS providers, the
//! operational alerting sink and the contact directory.

use crate::domain::{ChannelError, Contact, RenderedMessage};
use async_trait::async_trait;
use shared_types::{
    EventId, Notification, NotificationChannel, NotificationId, Recipient, RecordId,
    StorageError,
};

/// A message provider for one concrete channel.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// `Email` or `Sms`; never `Both`.
    fn channel(&self) -> NotificationChannel;

    /// Hand one message to the provider.
    ///
    /// Returns the provider's identifier for the message. Failures must be
    /// classified: transient ones are retried, permanent ones are not.
    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<String, ChannelError>;
}

/// A delivery that exhausted its retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSummary {
    pub notification_id: NotificationId,
    pub event_id: EventId,
    pub record_id: RecordId,
    pub recipient: Recipient,
    pub channel: NotificationChannel,
    pub attempts: u8,
    pub error: String,
}

/// Operational alerting.
pub trait AlertSink: Send + Sync {
    fn delivery_failed(&self, failure: &FailureSummary);

    /// The outcome of `entry` could not be written; the log still shows it
    /// `pending`.
    fn outcome_not_stored(&self, entry: &Notification, error: &StorageError);
}

/// Contact details of citizens and administrators.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn lookup(&self, recipient: &Recipient) -> Option<Contact>;
}
