//! Publish/subscribe fan-out for session events.
//!
//! Each subscriber gets its own unbounded channel, so a slow consumer never
//! blocks the session's read loop. Subscribers whose receiver was dropped are
//! pruned on the next publish.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use crate::event::Event;

/// Identifier returned by [`EventBus::subscribe`].
pub type SubscriptionId = u64;

#[derive(Debug, Default)]
struct BusInner {
    next_id: SubscriptionId,
    subscribers: Vec<(SubscriptionId, mpsc::UnboundedSender<Event>)>,
}

/// Cloneable handle to one session's event fan-out.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

/// Receiving side of a subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event. `None` once the subscription was removed.
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Take an already queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. It sees every event published from now on.
    pub fn subscribe(&self) -> Subscription {
        let (tx, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, tx));
        Subscription { id, receiver }
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    /// Deliver `event` to every live subscriber, in subscription order.
    pub fn publish(&self, event: Event) {
        trace!(kind = event.kind(), "Publishing event");
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}
