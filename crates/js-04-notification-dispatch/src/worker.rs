//! # Dispatch Worker
//!
//! Drains the transition event queue in the background. Each event is
//! dispatched on its own task so a slow provider on one record never holds
//! up another; provider concurrency is bounded inside the dispatcher.
//!
//! Shutdown closes the queue, dispatches whatever was already queued and
//! waits for every in-flight dispatch before returning its stats.

use crate::domain::{DispatchReport, DispatchResult};
use crate::ports::inbound::DispatchApi;
use shared_bus::Subscription;
use shared_types::TransitionEvent;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{error, info};

/// Totals over the worker's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub events: u64,
    pub sent: u64,
    pub failed: u64,
    pub skipped: u64,
    /// Dispatches that errored, including partially queued ones.
    pub errors: u64,
}

impl WorkerStats {
    fn count(&mut self, report: &DispatchReport) {
        self.sent += report.sent() as u64;
        self.failed += report.failed() as u64;
        if report.skipped.is_some() && report.deliveries.is_empty() {
            self.skipped += 1;
        }
    }

    fn absorb(&mut self, joined: Result<DispatchResult<DispatchReport>, JoinError>) {
        match joined {
            Ok(Ok(report)) => self.count(&report),
            Ok(Err(e)) => {
                self.errors += 1;
                if let Some(report) = e.partial_report() {
                    self.count(report);
                }
                error!(error = %e, "Dispatch failed");
            }
            Err(e) => {
                self.errors += 1;
                error!(error = %e, "Dispatch task aborted");
            }
        }
    }
}

pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<WorkerStats>,
}

impl WorkerHandle {
    /// Stop consuming, finish queued and in-flight work, return the totals.
    pub async fn shutdown(self) -> WorkerStats {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "Dispatch worker aborted");
                WorkerStats::default()
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub struct DispatchWorker;

impl DispatchWorker {
    /// Spawn the worker on the current runtime.
    ///
    /// Dropping the returned handle also stops the worker, with the same
    /// drain as [`WorkerHandle::shutdown`].
    pub fn spawn<D>(dispatcher: Arc<D>, subscription: Subscription) -> WorkerHandle
    where
        D: DispatchApi + 'static,
    {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(dispatcher, subscription, shutdown_rx));
        WorkerHandle { shutdown, task }
    }
}

async fn run<D>(
    dispatcher: Arc<D>,
    mut subscription: Subscription,
    mut shutdown_rx: watch::Receiver<bool>,
) -> WorkerStats
where
    D: DispatchApi + 'static,
{
    let mut stats = WorkerStats::default();
    let mut tasks: JoinSet<DispatchResult<DispatchReport>> = JoinSet::new();

    info!("Dispatch worker started");
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            next = subscription.recv() => match next {
                Ok(event) => {
                    stats.events += 1;
                    spawn_dispatch(&mut tasks, &dispatcher, event);
                }
                Err(_) => {
                    info!("Event queue closed");
                    break;
                }
            },
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => stats.absorb(joined),
        }
    }

    subscription.close();
    while let Ok(Some(event)) = subscription.try_recv() {
        stats.events += 1;
        spawn_dispatch(&mut tasks, &dispatcher, event);
    }
    while let Some(joined) = tasks.join_next().await {
        stats.absorb(joined);
    }

    info!(
        events = stats.events,
        sent = stats.sent,
        failed = stats.failed,
        errors = stats.errors,
        "Dispatch worker stopped"
    );
    stats
}

fn spawn_dispatch<D>(
    tasks: &mut JoinSet<DispatchResult<DispatchReport>>,
    dispatcher: &Arc<D>,
    event: TransitionEvent,
) where
    D: DispatchApi + 'static,
{
    let dispatcher = dispatcher.clone();
    tasks.spawn(async move { dispatcher.dispatch(&event).await });
}
