//! Broadcast bus for domain events.

use tokio::sync::broadcast;
use tracing::trace;

use credence_core::models::CredenceEvent;

/// Fan-out of [`CredenceEvent`]s. Publishing never blocks and never fails:
/// with no subscribers the event is dropped, and a slow subscriber sees
/// `RecvError::Lagged` instead of stalling the engine.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CredenceEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CredenceEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: CredenceEvent) {
        let name = event.name();
        // Err only means nobody is listening.
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(event = name, delivered, "published");
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
