//! Log-only channel adapters.
//!
//! Stand-ins for the email and SMS providers: every message is written to
//! the log and acknowledged with a local identifier.

use async_trait::async_trait;
use js_04_notification_dispatch::{ChannelAdapter, ChannelError, RenderedMessage};
use shared_types::NotificationChannel;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug)]
pub struct LogChannel {
    channel: NotificationChannel,
    sent: AtomicU64,
}

impl LogChannel {
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            channel,
            sent: AtomicU64::new(0),
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChannelAdapter for LogChannel {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<String, ChannelError> {
        if address.is_empty() {
            return Err(ChannelError::Permanent("empty address".into()));
        }
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            channel = %self.channel,
            to = %address,
            subject = message.subject.as_deref().unwrap_or(""),
            body = %message.body,
            "Outgoing notification"
        );
        Ok(format!("log-{}-{n}", self.channel))
    }
}
