//! # Event Subscriber
//!
//! Defines the consuming side of the transition event queue.

use shared_types::TransitionEvent;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::Stream;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Every producer was dropped and the queue is drained.
    #[error("Event bus closed")]
    Closed,

    /// The queue already has its consumer.
    #[error("Event bus already has a subscriber")]
    AlreadySubscribed,
}

/// The consumer handle for transition events.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<TransitionEvent>,
    depth: Arc<AtomicUsize>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<TransitionEvent>,
        depth: Arc<AtomicUsize>,
    ) -> Self {
        Self { receiver, depth }
    }

    fn taken(&self, event: Option<TransitionEvent>) -> Option<TransitionEvent> {
        if event.is_some() {
            self.depth.fetch_sub(1, Ordering::Relaxed);
        }
        event
    }

    /// Receive the next event, waiting if the queue is empty.
    pub async fn recv(&mut self) -> Result<TransitionEvent, SubscriptionError> {
        let event = self.receiver.recv().await;
        self.taken(event).ok_or(SubscriptionError::Closed)
    }

    /// Receive without waiting. `Ok(None)` when the queue is momentarily empty.
    pub fn try_recv(&mut self) -> Result<Option<TransitionEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(self.taken(Some(event))),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Stop accepting new events; already queued events can still be received.
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Convert into a `Stream`.
    #[must_use]
    pub fn into_stream(self) -> EventStream {
        EventStream { inner: self }
    }
}

/// Stream adapter over a subscription.
#[derive(Debug)]
pub struct EventStream {
    inner: Subscription,
}

impl Stream for EventStream {
    type Item = TransitionEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.receiver.poll_recv(cx) {
            Poll::Ready(event) => Poll::Ready(this.inner.taken(event)),
            Poll::Pending => Poll::Pending,
        }
    }
}
