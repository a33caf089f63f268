//! # Jiseti Case Service
//!
//! Starts the case core with log-only notification channels and runs until
//! Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `JS_*` environment variables
//! 2. Initialize logging
//! 3. Validate configuration
//! 4. Build the service container and start the dispatch worker
//! 5. Optionally (`--demo`) walk one record through its lifecycle
//! 6. Wait for Ctrl+C, then drain pending deliveries

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use js_02_status_transition::{NewRecord, TransitionApi, TransitionRequest};
use js_04_notification_dispatch::{Contact, DispatchApi, StaticDirectory};
use js_runtime::{CaseService, RuntimeConfig};
use shared_types::{Actor, AdminId, Recipient, RecordKind, RecordStatus, UrgencyLevel, UserId};

const DEMO_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Submit, triage and resolve one record, then print its trail.
async fn run_demo(service: &CaseService, directory: &StaticDirectory) -> Result<()> {
    let citizen = UserId::new();
    let admin = AdminId::new();
    directory.insert(
        Recipient::Citizen(citizen),
        Contact::new("Demo Citizen", "citizen@example.org").with_phone("0700000000"),
    );
    directory.insert(
        Recipient::Admin(admin),
        Contact::new("Demo Admin", "admin@example.org"),
    );

    let record = service
        .transitions
        .submit_record(
            NewRecord::new(
                RecordKind::Intervention,
                "Broken water pipe",
                "Main pipe on Moi Avenue has leaked for two weeks",
            )
            .with_urgency(UrgencyLevel::High),
            Actor::Citizen(citizen),
        )
        .await
        .context("Failed to submit demo record")?;

    let mut events = Vec::new();
    for request in [
        TransitionRequest::new(record.id, RecordStatus::UnderInvestigation, Actor::Admin(admin)),
        TransitionRequest::new(record.id, RecordStatus::Resolved, Actor::Admin(admin))
            .with_reason("Pipe replaced by the county water company"),
    ] {
        let event = service
            .transitions
            .request_transition(request)
            .await
            .context("Demo transition failed")?;
        info!(from = %event.old_status, to = %event.new_status, "Demo transition applied");
        events.push(event.event_id);
    }

    for entry in service.transitions.history(record.id).iter() {
        let entry = entry.context("Failed to read history")?;
        info!(
            sequence = entry.sequence,
            from = %entry.old_status,
            to = %entry.new_status,
            "History"
        );
    }

    let settled = service
        .settled_deliveries(record.id, &events, DEMO_SETTLE_TIMEOUT)
        .await
        .context("Failed to read delivery log")?;
    let log = match settled {
        Some(log) => log,
        None => {
            warn!(
                record_id = %record.id,
                "Demo deliveries still pending, showing the log as it stands"
            );
            service
                .dispatcher
                .delivery_log(record.id)
                .context("Failed to read delivery log")?
        }
    };
    for n in log {
        info!(
            recipient = %n.recipient,
            channel = %n.channel,
            status = ?n.status,
            attempts = n.attempts,
            "Delivery"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    js_telemetry::init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;
    config.validate().context("Invalid configuration")?;

    let directory = Arc::new(StaticDirectory::new());
    let service = CaseService::with_log_channels(config, directory.clone())
        .context("Failed to start case service")?;

    if std::env::args().any(|arg| arg == "--demo") {
        run_demo(&service, &directory).await?;
    }

    info!("Jiseti is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    let stats = service.shutdown().await;
    let metrics = js_telemetry::render_metrics().context("Failed to render metrics")?;
    debug!("Final metrics:\n{metrics}");
    info!(events = stats.events, errors = stats.errors, "Stopped");
    Ok(())
}
