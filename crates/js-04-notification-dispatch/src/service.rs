//! # Notification Dispatcher
//!
//! Turns a committed transition into one delivery entry per
//! recipient × channel pair and drives every entry to `sent` or `failed`.
//!
//! ## Delivery
//!
//! ```text
//! dispatch(event)
//!   ├─ record gone?            → no entries
//!   ├─ select recipients       → creator (+ assigned admin when urgent)
//!   ├─ per pair: insert pending entry, spawn delivery
//!   │     └─ permit → send → ok        → sent
//!   │                      → transient → backoff, retry (≤ max_attempts)
//!   │                      → permanent → failed
//!   │     └─ store outcome     → retried on the same backoff, alert if lost
//!   └─ await all deliveries    → DispatchReport
//! ```
//!
//! A semaphore bounds concurrent provider calls across all dispatches. The
//! permit is held only for the call itself, so a delivery sleeping through
//! its backoff never blocks another pair.

use crate::domain::{
    render, select_recipients, Audience, ChannelError, DeliveryOutcome, DispatchError,
    DispatchReport, DispatchResult, RenderedMessage, RetryPolicy, SkipReason,
    DEFAULT_MAX_ATTEMPTS,
};
use crate::metrics;
use crate::ports::inbound::DispatchApi;
use crate::ports::outbound::{AlertSink, ChannelAdapter, FailureSummary, RecipientDirectory};
use async_trait::async_trait;
use js_01_record_storage::{
    NotificationRepository, RecordRepository, SettleOutcome, VoteRepository,
};
use js_03_vote_aggregation::VoteTally;
use shared_types::{
    DeliveryStatus, EventId, Notification, NotificationChannel, NotificationId, Recipient,
    Record, RecordId, StorageError, TimeSource, TransitionEvent,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Provider calls per entry, first try included.
    pub max_attempts: u8,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_jitter: bool,
    /// Provider calls in flight at once, across all dispatches.
    pub max_concurrent_deliveries: usize,
    /// Notify on `under-investigation → under-investigation` re-assignment.
    pub notify_on_reassignment: bool,
    /// Urgent votes that make a record urgent. Zero disables.
    pub urgent_vote_threshold: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            backoff_jitter: true,
            max_concurrent_deliveries: 16,
            notify_on_reassignment: true,
            urgent_vote_threshold: 10,
        }
    }
}

impl DispatchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: self.base_backoff,
            max_delay: self.max_backoff,
            jitter: self.backoff_jitter,
        }
    }
}

/// One entry plus what is needed to deliver it.
struct Delivery {
    entry: Notification,
    address: Option<String>,
    adapter: Option<Arc<dyn ChannelAdapter>>,
}

/// Shared state of delivery tasks.
struct Courier<R> {
    repo: Arc<R>,
    alerts: Arc<dyn AlertSink>,
    time: Arc<dyn TimeSource>,
    permits: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl<R> Clone for Courier<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            alerts: self.alerts.clone(),
            time: self.time.clone(),
            permits: self.permits.clone(),
            retry: self.retry.clone(),
        }
    }
}

impl<R: NotificationRepository> Courier<R> {
    async fn attempt_until_settled(
        &self,
        adapter: &dyn ChannelAdapter,
        address: &str,
        entry: &Notification,
    ) -> (u8, Result<String, ChannelError>) {
        let message = RenderedMessage {
            subject: entry.subject.clone(),
            body: entry.message.clone(),
        };
        let mut attempts = 0u8;
        loop {
            attempts += 1;
            let result = match self.permits.clone().acquire_owned().await {
                Ok(_permit) => adapter.send(address, &message).await,
                Err(_) => Err(ChannelError::Permanent("dispatcher closed".into())),
            };
            match result {
                Ok(external_id) => return (attempts, Ok(external_id)),
                Err(err) if err.is_transient() && self.retry.allows_retry(attempts) => {
                    let delay = self.retry.delay_after(attempts);
                    warn!(
                        notification_id = %entry.id,
                        channel = %entry.channel,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient delivery failure, retrying"
                    );
                    metrics::record_delivery_retry(entry.channel.as_str());
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return (attempts, Err(err)),
            }
        }
    }

    /// Write the terminal entry, retrying storage failures on the delivery
    /// backoff. An outcome that still cannot be written goes to the alert
    /// sink, since the log keeps showing the entry `pending`.
    async fn store_outcome(&self, entry: &Notification) -> bool {
        let mut tries = 0u8;
        loop {
            tries += 1;
            match self.repo.settle_notification(entry) {
                Ok(SettleOutcome::Settled) => return true,
                Ok(SettleOutcome::Orphaned) => {
                    info!(
                        notification_id = %entry.id,
                        record_id = %entry.record_id,
                        status = ?entry.status,
                        "Record deleted during delivery; outcome not stored"
                    );
                    return false;
                }
                Err(e)
                    if !matches!(e, StorageError::Immutable(_))
                        && self.retry.allows_retry(tries) =>
                {
                    let delay = self.retry.delay_after(tries);
                    warn!(
                        notification_id = %entry.id,
                        attempt = tries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Failed to store delivery outcome, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        notification_id = %entry.id,
                        status = ?entry.status,
                        error = %e,
                        "Failed to store delivery outcome"
                    );
                    metrics::record_notification_unsettled(entry.channel.as_str());
                    self.alerts.outcome_not_stored(entry, &e);
                    return false;
                }
            }
        }
    }

    async fn deliver(self, delivery: Delivery) -> DeliveryOutcome {
        let Delivery {
            mut entry,
            address,
            adapter,
        } = delivery;

        let (attempts, result) = match (adapter, address) {
            (None, _) => (
                0,
                Err(ChannelError::Permanent(format!(
                    "no {} adapter configured",
                    entry.channel
                ))),
            ),
            (_, None) => (
                0,
                Err(ChannelError::Permanent(format!(
                    "no {} address on file",
                    entry.channel
                ))),
            ),
            (Some(adapter), Some(address)) => {
                self.attempt_until_settled(adapter.as_ref(), &address, &entry)
                    .await
            }
        };

        let channel = entry.channel.as_str();
        let marked = match result {
            Ok(external_id) => {
                debug!(
                    notification_id = %entry.id,
                    channel,
                    attempts,
                    external_id = %external_id,
                    "Notification sent"
                );
                metrics::record_notification_sent(channel);
                entry.mark_sent(external_id, attempts, self.time.now())
            }
            Err(err) => {
                metrics::record_notification_failed(channel);
                let exhausted = err.is_transient();
                let message = err.to_string();
                let marked = entry.mark_failed(message.clone(), attempts);
                if exhausted {
                    self.alerts.delivery_failed(&FailureSummary {
                        notification_id: entry.id,
                        event_id: entry.event_id,
                        record_id: entry.record_id,
                        recipient: entry.recipient,
                        channel: entry.channel,
                        attempts,
                        error: message,
                    });
                } else {
                    warn!(
                        notification_id = %entry.id,
                        recipient = %entry.recipient,
                        channel,
                        error = %message,
                        "Notification failed permanently"
                    );
                }
                marked
            }
        };
        if let Err(status) = marked {
            error!(notification_id = %entry.id, ?status, "Entry settled twice");
        }

        let persisted = self.store_outcome(&entry).await;

        DeliveryOutcome {
            notification_id: entry.id,
            recipient: entry.recipient,
            channel: entry.channel,
            status: entry.status,
            attempts,
            persisted,
        }
    }
}

/// Notification dispatcher.
pub struct NotificationDispatcher<R> {
    courier: Courier<R>,
    directory: Arc<dyn RecipientDirectory>,
    channels: HashMap<NotificationChannel, Arc<dyn ChannelAdapter>>,
    config: DispatchConfig,
}

impl<R> NotificationDispatcher<R>
where
    R: RecordRepository + VoteRepository + NotificationRepository + 'static,
{
    pub fn new(
        repo: Arc<R>,
        directory: Arc<dyn RecipientDirectory>,
        alerts: Arc<dyn AlertSink>,
        time: Arc<dyn TimeSource>,
        config: DispatchConfig,
    ) -> Self {
        let courier = Courier {
            repo,
            alerts,
            time,
            permits: Arc::new(Semaphore::new(config.max_concurrent_deliveries.max(1))),
            retry: config.retry_policy(),
        };
        Self {
            courier,
            directory,
            channels: HashMap::new(),
            config,
        }
    }

    /// Register the adapter for its channel, replacing any previous one.
    #[must_use]
    pub fn with_channel(mut self, adapter: Arc<dyn ChannelAdapter>) -> Self {
        self.channels.insert(adapter.channel(), adapter);
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Stop handing out delivery permits; queued attempts fail permanently.
    pub fn close(&self) {
        self.courier.permits.close();
    }

    fn is_urgent(&self, record: &Record) -> DispatchResult<bool> {
        if record.urgency.is_escalated() {
            return Ok(true);
        }
        let votes = self.courier.repo.votes_for(&record.id)?;
        Ok(VoteTally::from_votes(&votes).escalates(self.config.urgent_vote_threshold))
    }

    fn pending_entry(
        &self,
        event_id: EventId,
        record_id: RecordId,
        recipient: Recipient,
        channel: NotificationChannel,
        message: RenderedMessage,
    ) -> Notification {
        Notification {
            id: NotificationId::new(),
            event_id,
            record_id,
            recipient,
            channel,
            subject: message.subject,
            message: message.body,
            status: DeliveryStatus::Pending,
            external_id: None,
            attempts: 0,
            error: None,
            retry_of: None,
            created_at: self.courier.time.now(),
            sent_at: None,
        }
    }

    fn delivery(&self, entry: Notification, address: Option<String>) -> Delivery {
        let adapter = self.channels.get(&entry.channel).cloned();
        Delivery {
            entry,
            address,
            adapter,
        }
    }

    async fn plan(&self, record: &Record, event: &TransitionEvent, urgent: bool) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        for (recipient, audience) in select_recipients(record, urgent) {
            let contact = self.directory.lookup(&recipient).await;
            let (name, channels) = match &contact {
                Some(c) => (c.name.as_str(), c.channels()),
                None => ("there", Vec::new()),
            };
            if channels.is_empty() {
                // Leave a failed email entry behind rather than no trace.
                warn!(
                    record_id = %record.id,
                    recipient = %recipient,
                    "Recipient has no reachable contact"
                );
                deliveries.push(self.planned(
                    record,
                    event,
                    recipient,
                    audience,
                    name,
                    NotificationChannel::Email,
                    None,
                ));
                continue;
            }
            for channel in channels {
                let address = contact.as_ref().and_then(|c| c.address(channel));
                deliveries.push(self.planned(
                    record, event, recipient, audience, name, channel, address,
                ));
            }
        }
        deliveries
    }

    #[allow(clippy::too_many_arguments)]
    fn planned(
        &self,
        record: &Record,
        event: &TransitionEvent,
        recipient: Recipient,
        audience: Audience,
        name: &str,
        channel: NotificationChannel,
        address: Option<String>,
    ) -> Delivery {
        let message = render(channel, audience, name, record, event);
        let entry = self.pending_entry(event.event_id, record.id, recipient, channel, message);
        self.delivery(entry, address)
    }

    /// Queue every delivery, then wait for all of them to settle.
    ///
    /// A pair whose entry cannot be stored does not stop the others; the run
    /// then ends in `DispatchError::Incomplete` carrying what did run.
    async fn run(
        &self,
        deliveries: Vec<Delivery>,
        mut report: DispatchReport,
    ) -> DispatchResult<DispatchReport> {
        let mut tasks = JoinSet::new();
        let mut unqueued = 0usize;
        let mut queue_error = None;

        for delivery in deliveries {
            match self.courier.repo.insert_notification(&delivery.entry) {
                Ok(true) => {
                    tasks.spawn(self.courier.clone().deliver(delivery));
                }
                Ok(false) => {
                    info!(
                        record_id = %report.record_id,
                        queued = tasks.len(),
                        "Record deleted; no further notifications queued"
                    );
                    metrics::record_dispatch_skipped(SkipReason::RecordDeleted.as_str());
                    report.skipped = Some(SkipReason::RecordDeleted);
                    break;
                }
                Err(e) => {
                    error!(
                        record_id = %report.record_id,
                        recipient = %delivery.entry.recipient,
                        channel = %delivery.entry.channel,
                        error = %e,
                        "Failed to queue notification"
                    );
                    metrics::record_notification_unqueued();
                    unqueued += 1;
                    queue_error.get_or_insert(e);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.deliveries.push(outcome),
                Err(e) => error!(record_id = %report.record_id, error = %e, "Delivery task aborted"),
            }
        }

        match queue_error {
            Some(source) if report.deliveries.is_empty() && report.skipped.is_none() => {
                Err(DispatchError::Storage(source))
            }
            Some(source) => Err(DispatchError::Incomplete {
                record_id: report.record_id,
                unqueued,
                report: Box::new(report),
                source,
            }),
            None => Ok(report),
        }
    }

    fn skipped(&self, report: DispatchReport, reason: SkipReason) -> DispatchReport {
        info!(
            record_id = %report.record_id,
            reason = reason.as_str(),
            "Dispatch produced no notifications"
        );
        metrics::record_dispatch_skipped(reason.as_str());
        report.skip(reason)
    }
}

#[async_trait]
impl<R> DispatchApi for NotificationDispatcher<R>
where
    R: RecordRepository + VoteRepository + NotificationRepository + 'static,
{
    async fn dispatch(&self, event: &TransitionEvent) -> DispatchResult<DispatchReport> {
        let report = DispatchReport::new(event.record_id, Some(event.event_id));
        if event.is_reassignment() && !self.config.notify_on_reassignment {
            return Ok(self.skipped(report, SkipReason::ReassignmentSuppressed));
        }
        let Some(record) = self.courier.repo.get_record(&event.record_id)? else {
            return Ok(self.skipped(report, SkipReason::RecordDeleted));
        };

        let urgent = self.is_urgent(&record)?;
        let deliveries = self.plan(&record, event, urgent).await;
        if deliveries.is_empty() {
            return Ok(self.skipped(report, SkipReason::NoRecipients));
        }

        let report = self.run(deliveries, report).await?;
        info!(
            event_id = %event.event_id,
            record_id = %event.record_id,
            sent = report.sent(),
            failed = report.failed(),
            "Dispatch complete"
        );
        Ok(report)
    }

    async fn redeliver_failed(&self, record_id: RecordId) -> DispatchResult<DispatchReport> {
        let report = DispatchReport::new(record_id, None);
        if self.courier.repo.get_record(&record_id)?.is_none() {
            return Ok(self.skipped(report, SkipReason::RecordDeleted));
        }

        let log = self.courier.repo.notifications_for(&record_id)?;
        let retried: HashSet<NotificationId> = log.iter().filter_map(|n| n.retry_of).collect();

        let mut deliveries = Vec::new();
        for failed in log
            .iter()
            .filter(|n| n.status == DeliveryStatus::Failed && !retried.contains(&n.id))
        {
            let address = self
                .directory
                .lookup(&failed.recipient)
                .await
                .and_then(|c| c.address(failed.channel));
            let message = RenderedMessage {
                subject: failed.subject.clone(),
                body: failed.message.clone(),
            };
            let mut entry = self.pending_entry(
                failed.event_id,
                record_id,
                failed.recipient,
                failed.channel,
                message,
            );
            entry.retry_of = Some(failed.id);
            deliveries.push(self.delivery(entry, address));
        }
        if deliveries.is_empty() {
            return Ok(self.skipped(report, SkipReason::NothingToRedeliver));
        }

        let report = self.run(deliveries, report).await?;
        info!(
            record_id = %record_id,
            sent = report.sent(),
            failed = report.failed(),
            "Redelivery complete"
        );
        Ok(report)
    }

    fn delivery_log(&self, record_id: RecordId) -> DispatchResult<Vec<Notification>> {
        Ok(self.courier.repo.notifications_for(&record_id)?)
    }
}
