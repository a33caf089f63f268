//! Scriptable in-memory channel.
//!
//! Records every message it accepts and can be told to fail, either for the
//! next few calls, for every call, or for particular addresses.

use crate::domain::{ChannelError, RenderedMessage};
use crate::ports::outbound::ChannelAdapter;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::NotificationChannel;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub address: String,
    pub message: RenderedMessage,
    pub external_id: String,
}

#[derive(Debug, Default)]
struct Script {
    next: VecDeque<ChannelError>,
    always: Option<ChannelError>,
    by_address: HashMap<String, ChannelError>,
}

#[derive(Debug)]
pub struct MemoryChannel {
    channel: NotificationChannel,
    latency: Duration,
    script: Mutex<Script>,
    sent: Mutex<Vec<SentMessage>>,
    calls: AtomicU64,
}

impl MemoryChannel {
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            channel,
            latency: Duration::ZERO,
            script: Mutex::new(Script::default()),
            sent: Mutex::new(Vec::new()),
            calls: AtomicU64::new(0),
        }
    }

    pub fn email() -> Self {
        Self::new(NotificationChannel::Email)
    }

    pub fn sms() -> Self {
        Self::new(NotificationChannel::Sms)
    }

    /// Sleep this long inside every `send`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail the next call with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: ChannelError) {
        self.script.lock().next.push_back(error);
    }

    pub fn fail_always(&self, error: ChannelError) {
        self.script.lock().always = Some(error);
    }

    pub fn fail_address(&self, address: impl Into<String>, error: ChannelError) {
        self.script.lock().by_address.insert(address.into(), error);
    }

    /// Forget every scripted failure.
    pub fn heal(&self) {
        *self.script.lock() = Script::default();
    }

    /// Calls made, failed ones included.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    fn scripted_failure(&self, address: &str) -> Option<ChannelError> {
        let mut script = self.script.lock();
        if let Some(err) = script.by_address.get(address) {
            return Some(err.clone());
        }
        if let Some(err) = script.next.pop_front() {
            return Some(err);
        }
        script.always.clone()
    }
}

#[async_trait]
impl ChannelAdapter for MemoryChannel {
    fn channel(&self) -> NotificationChannel {
        self.channel
    }

    async fn send(&self, address: &str, message: &RenderedMessage) -> Result<String, ChannelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(err) = self.scripted_failure(address) {
            return Err(err);
        }
        let external_id = format!("{}-{call}", self.channel.as_str());
        self.sent.lock().push(SentMessage {
            address: address.to_string(),
            message: message.clone(),
            external_id: external_id.clone(),
        });
        Ok(external_id)
    }
}
