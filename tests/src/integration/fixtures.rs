//! # Test Harness
//!
//! A [`CaseService`] wired with scriptable in-memory channels, a recording
//! alert sink and a manual clock.

use std::sync::Arc;
use std::time::Duration;

use js_02_status_transition::{NewRecord, TransitionApi, TransitionRequest};
use js_04_notification_dispatch::{
    AlertSink, ChannelAdapter, Contact, FailureSummary, MemoryChannel, StaticDirectory,
    WorkerStats,
};
use js_runtime::{CaseService, Ledger, RuntimeConfig};
use parking_lot::Mutex;
use shared_types::{
    Actor, AdminId, ManualTimeSource, Notification, NotificationId, Record, Recipient,
    RecordKind, RecordStatus, StorageError, UrgencyLevel, UserId,
};

/// Alert sink that keeps every failure.
#[derive(Default)]
pub struct RecordingAlerts {
    failures: Mutex<Vec<FailureSummary>>,
    unstored: Mutex<Vec<NotificationId>>,
}

impl RecordingAlerts {
    pub fn failures(&self) -> Vec<FailureSummary> {
        self.failures.lock().clone()
    }

    /// Entries whose outcome could not be written.
    pub fn unstored(&self) -> Vec<NotificationId> {
        self.unstored.lock().clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn delivery_failed(&self, failure: &FailureSummary) {
        self.failures.lock().push(failure.clone());
    }

    fn outcome_not_stored(&self, entry: &Notification, _error: &StorageError) {
        self.unstored.lock().push(entry.id);
    }
}

pub struct Harness {
    pub service: CaseService,
    pub directory: Arc<StaticDirectory>,
    pub email: Arc<MemoryChannel>,
    pub sms: Arc<MemoryChannel>,
    pub alerts: Arc<RecordingAlerts>,
    pub clock: Arc<ManualTimeSource>,
    phones: Mutex<u32>,
}

impl Harness {
    /// Default settings with millisecond backoff and no jitter.
    pub fn fast_config() -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.dispatch.base_backoff = Duration::from_millis(1);
        config.dispatch.max_backoff = Duration::from_millis(10);
        config.dispatch.backoff_jitter = false;
        config
    }

    /// Start a service. Must run inside a tokio runtime.
    pub fn start(config: RuntimeConfig) -> Self {
        Self::start_with_channels(config, MemoryChannel::email(), MemoryChannel::sms())
    }

    pub fn start_with_channels(
        config: RuntimeConfig,
        email: MemoryChannel,
        sms: MemoryChannel,
    ) -> Self {
        let directory = Arc::new(StaticDirectory::new());
        let email = Arc::new(email);
        let sms = Arc::new(sms);
        let alerts = Arc::new(RecordingAlerts::default());
        let clock = Arc::new(ManualTimeSource::new(1_700_000_000_000));
        let channels: Vec<Arc<dyn ChannelAdapter>> = vec![email.clone(), sms.clone()];

        let service = CaseService::start_with(
            config,
            directory.clone(),
            channels,
            alerts.clone(),
            clock.clone(),
        )
        .expect("service starts");

        Self {
            service,
            directory,
            email,
            sms,
            alerts,
            clock,
            phones: Mutex::new(0),
        }
    }

    fn next_phone(&self) -> String {
        let mut n = self.phones.lock();
        *n += 1;
        format!("07{:08}", *n)
    }

    /// Register a citizen reachable by email and SMS.
    pub fn citizen(&self, name: &str) -> UserId {
        let id = UserId::new();
        let contact = Contact::new(name, format!("{}@example.org", name.to_lowercase()))
            .with_phone(self.next_phone());
        self.directory.insert(Recipient::Citizen(id), contact);
        id
    }

    /// Register an administrator reachable by email and SMS.
    pub fn admin(&self, name: &str) -> AdminId {
        let id = AdminId::new();
        let contact = Contact::new(name, format!("{}@admin.example.org", name.to_lowercase()))
            .with_phone(self.next_phone());
        self.directory.insert(Recipient::Admin(id), contact);
        id
    }

    /// Submit a draft red-flag on behalf of `citizen`.
    pub async fn draft(&self, citizen: UserId, title: &str, urgency: UrgencyLevel) -> Record {
        self.service
            .transitions
            .submit_record(
                NewRecord::new(RecordKind::RedFlag, title, "Reported through the harness")
                    .with_urgency(urgency),
                Actor::Citizen(citizen),
            )
            .await
            .expect("draft submitted")
    }

    /// Submit and triage a record, returning it as stored afterwards.
    pub async fn under_investigation(
        &self,
        citizen: UserId,
        admin: AdminId,
        title: &str,
        urgency: UrgencyLevel,
    ) -> Record {
        let record = self.draft(citizen, title, urgency).await;
        self.clock.advance(1_000);
        self.service
            .transitions
            .request_transition(TransitionRequest::new(
                record.id,
                RecordStatus::UnderInvestigation,
                Actor::Admin(admin),
            ))
            .await
            .expect("triaged");
        self.service
            .transitions
            .get_record(record.id)
            .expect("record exists")
    }

    /// Shut the service down, draining every queued delivery.
    pub async fn settle(self) -> Settled {
        let ledger = self.service.ledger.clone();
        let stats = self.service.shutdown().await;
        Settled {
            ledger,
            stats,
            email: self.email,
            sms: self.sms,
            alerts: self.alerts,
        }
    }
}

/// What remains after shutdown.
pub struct Settled {
    pub ledger: Arc<Ledger>,
    pub stats: WorkerStats,
    pub email: Arc<MemoryChannel>,
    pub sms: Arc<MemoryChannel>,
    pub alerts: Arc<RecordingAlerts>,
}
