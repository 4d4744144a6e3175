//! In-process event bus
//!
//! Fans [`DomainEvent`]s out to any number of subscribers over a tokio
//! broadcast channel. Publishing never blocks; lagging subscribers lose the
//! oldest events.

use matchcall_core::DomainEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default broadcast buffer size
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Cloneable publisher handle
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
    published: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self {
            sender,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish an event; returns how many subscribers received it
    pub fn publish(&self, event: DomainEvent) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::trace!(event_type, receivers, "Domain event published");
                receivers
            }
            // No subscribers is the normal case for headless use
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Total events published since creation
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchcall_core::events::DeckEvent;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(DomainEvent::DeckExhausted(DeckEvent::now())), 0);
        assert_eq!(bus.published(), 1);
    }

    #[test]
    fn test_subscribers_receive_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        assert_eq!(bus.publish(DomainEvent::DeckReplenished(DeckEvent::now())), 1);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.event_type(), "DECK_REPLENISHED");
    }
}
