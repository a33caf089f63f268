//! # Event Publisher
//!
//! Defines the publishing side of the transition event queue.

use crate::subscriber::{Subscription, SubscriptionError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::TransitionEvent;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Errors from publishing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The consumer side was dropped; the event was not enqueued.
    #[error("Event queue closed, event {event_id} not enqueued")]
    Closed { event_id: String },
}

/// Trait for handing transition events to the dispatcher.
///
/// This is the interface the transition engine uses to emit events for
/// asynchronous consumption.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Enqueue an event.
    ///
    /// Implementations must not wait on the consumer: the engine publishes
    /// while it holds a record lock, and a request must never stall on
    /// notification work.
    async fn publish(&self, event: TransitionEvent) -> Result<(), PublishError>;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory implementation of the event queue.
///
/// Uses an unbounded `tokio::sync::mpsc` channel: single consumer, FIFO,
/// lossless while the consumer is alive, and `publish` completes without
/// yielding. `capacity` is the depth above which the queue reports a
/// backlog. Distributed deployments would use a durable broker instead.
pub struct InMemoryEventBus {
    /// Producer side.
    sender: mpsc::UnboundedSender<TransitionEvent>,

    /// Consumer side, handed out once.
    receiver: Mutex<Option<mpsc::UnboundedReceiver<TransitionEvent>>>,

    /// Events sent but not yet received, shared with the subscription.
    depth: Arc<AtomicUsize>,

    /// Total events published.
    events_published: AtomicU64,

    /// Backlog threshold.
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus that reports a backlog beyond
    /// `capacity` queued events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            depth: Arc::new(AtomicUsize::new(0)),
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Take the consumer side of the queue.
    ///
    /// There is exactly one consumer; a second call fails.
    pub fn subscribe(&self) -> Result<Subscription, SubscriptionError> {
        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or(SubscriptionError::AlreadySubscribed)?;
        debug!("Transition event consumer attached");
        Ok(Subscription::new(receiver, Arc::clone(&self.depth)))
    }

    /// Events enqueued but not yet received.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Get the backlog threshold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether more than `capacity` events are waiting.
    #[must_use]
    pub fn is_backlogged(&self) -> bool {
        self.queued() > self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: TransitionEvent) -> Result<(), PublishError> {
        let event_id = event.event_id;
        let record_id = event.record_id;

        // Counted before sending so the consumer never sees the depth at zero
        // while holding an event.
        let depth = self.depth.fetch_add(1, Ordering::Relaxed) + 1;
        if self.sender.send(event).is_err() {
            self.depth.fetch_sub(1, Ordering::Relaxed);
            error!(
                event_id = %event_id,
                record_id = %record_id,
                "Transition event not enqueued (consumer gone)"
            );
            return Err(PublishError::Closed {
                event_id: event_id.to_string(),
            });
        }

        self.events_published.fetch_add(1, Ordering::Relaxed);
        if depth == self.capacity + 1 {
            warn!(
                queued = depth,
                capacity = self.capacity,
                "Transition event backlog above capacity, dispatcher is behind"
            );
        }
        debug!(
            event_id = %event_id,
            record_id = %record_id,
            queued = depth,
            "Transition event enqueued"
        );
        Ok(())
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
