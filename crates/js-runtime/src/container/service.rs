//! # Case Service
//!
//! Owns the ledger, the event queue, the three engines and the dispatch
//! worker.
//!
//! ## Initialization Order
//!
//! ```text
//! 1. Storage backend → KvLedger
//! 2. Event queue + its single subscription
//! 3. TransitionEngine, VoteAggregator  (ledger, queue)
//! 4. NotificationDispatcher            (ledger, directory, channels, alerts)
//! 5. DispatchWorker                    (dispatcher, subscription)
//! ```
//!
//! Teardown runs the other way: the worker drains the queue and waits for
//! in-flight deliveries before the service is dropped.

use std::sync::Arc;
use std::time::Duration;

use js_01_record_storage::{KVStoreError, KvLedger};
use js_02_status_transition::TransitionEngine;
use js_03_vote_aggregation::VoteAggregator;
use js_04_notification_dispatch::{
    AlertSink, ChannelAdapter, DispatchApi, DispatchResult, DispatchWorker,
    NotificationDispatcher, RecipientDirectory, TracingAlertSink, WorkerHandle, WorkerStats,
};
use shared_bus::{InMemoryEventBus, SubscriptionError};
use shared_types::{
    EventId, Notification, NotificationChannel, RecordId, SystemTimeSource, TimeSource,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, instrument};

use crate::adapters::{LogChannel, StorageBackend};
use crate::container::config::{ConfigError, RuntimeConfig};

/// The ledger over the runtime-selected backend.
pub type Ledger = KvLedger<StorageBackend>;

pub type Transitions = TransitionEngine<Ledger, InMemoryEventBus>;
pub type Votes = VoteAggregator<Ledger>;
pub type Dispatcher = NotificationDispatcher<Ledger>;

const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to open storage: {0}")]
    Storage(#[from] KVStoreError),

    #[error("Failed to subscribe dispatcher: {0}")]
    Subscription(#[from] SubscriptionError),
}

/// The wired case service.
pub struct CaseService {
    pub ledger: Arc<Ledger>,
    pub bus: Arc<InMemoryEventBus>,
    pub transitions: Arc<Transitions>,
    pub votes: Arc<Votes>,
    pub dispatcher: Arc<Dispatcher>,
    worker: WorkerHandle,
    config: RuntimeConfig,
}

impl CaseService {
    /// Build every subsystem and start the dispatch worker.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(name = "case_service_init", skip_all)]
    pub fn start(
        config: RuntimeConfig,
        directory: Arc<dyn RecipientDirectory>,
        channels: Vec<Arc<dyn ChannelAdapter>>,
    ) -> Result<Self, ContainerError> {
        Self::start_with(
            config,
            directory,
            channels,
            Arc::new(TracingAlertSink),
            Arc::new(SystemTimeSource),
        )
    }

    /// [`CaseService::start`] with log-only email and SMS channels.
    pub fn with_log_channels(
        config: RuntimeConfig,
        directory: Arc<dyn RecipientDirectory>,
    ) -> Result<Self, ContainerError> {
        let channels: Vec<Arc<dyn ChannelAdapter>> = vec![
            Arc::new(LogChannel::new(NotificationChannel::Email)),
            Arc::new(LogChannel::new(NotificationChannel::Sms)),
        ];
        Self::start(config, directory, channels)
    }

    /// Full control over the alert sink and clock.
    pub fn start_with(
        config: RuntimeConfig,
        directory: Arc<dyn RecipientDirectory>,
        channels: Vec<Arc<dyn ChannelAdapter>>,
        alerts: Arc<dyn AlertSink>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;

        info!(backend = ?config.storage.backend, "Phase 1: opening storage");
        let ledger = Arc::new(KvLedger::new(StorageBackend::open(&config.storage)?));

        info!(
            capacity = config.transition.event_queue_capacity,
            "Phase 2: creating event queue"
        );
        let bus = Arc::new(InMemoryEventBus::with_capacity(
            config.transition.event_queue_capacity,
        ));
        let subscription = bus.subscribe()?;

        info!("Phase 3: initializing transition engine and vote aggregator");
        let transitions = Arc::new(TransitionEngine::new(
            ledger.clone(),
            bus.clone(),
            time.clone(),
            config.transition.clone(),
        ));
        let votes = Arc::new(VoteAggregator::new(ledger.clone(), time.clone()));

        info!(channels = channels.len(), "Phase 4: initializing dispatcher");
        let dispatcher = channels.into_iter().fold(
            NotificationDispatcher::new(
                ledger.clone(),
                directory,
                alerts,
                time,
                config.dispatch.clone(),
            ),
            |dispatcher, channel| dispatcher.with_channel(channel),
        );
        let dispatcher = Arc::new(dispatcher);

        info!("Phase 5: starting dispatch worker");
        let worker = DispatchWorker::spawn(dispatcher.clone(), subscription);

        Ok(Self {
            ledger,
            bus,
            transitions,
            votes,
            dispatcher,
            worker,
            config,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Poll the delivery log of `record_id` until each of `events` has its
    /// entries and none of them is still pending. `Ok(None)` if that takes
    /// longer than `timeout`.
    pub async fn settled_deliveries(
        &self,
        record_id: RecordId,
        events: &[EventId],
        timeout: Duration,
    ) -> DispatchResult<Option<Vec<Notification>>> {
        let deadline = Instant::now() + timeout;
        loop {
            let log = self.dispatcher.delivery_log(record_id)?;
            let queued = events.iter().all(|id| log.iter().any(|n| n.event_id == *id));
            if queued && log.iter().all(|n| n.status.is_terminal()) {
                return Ok(Some(log));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(SETTLE_POLL_INTERVAL).await;
        }
    }

    /// Stop intake of new events, finish queued deliveries, return totals.
    pub async fn shutdown(self) -> WorkerStats {
        info!("Initiating graceful shutdown...");
        let stats = self.worker.shutdown().await;
        info!(
            events = stats.events,
            sent = stats.sent,
            failed = stats.failed,
            "Shutdown complete"
        );
        stats
    }
}
