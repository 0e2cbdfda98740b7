//! Announcements from the device to whoever is watching the desk.
//!
//! The registry emits [`Event::CardPrinted`] on every append, the console
//! emits [`Event::StatusChanged`], and the desk emits [`Event::CardMoved`]
//! when a drag ends. Receivers that fall behind skip ahead rather than
//! block the sender.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::card::{Card, CardId, Placement};
use crate::status::Status;

/// Slots kept for slow receivers before they start lagging.
const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum Event {
    /// A new card was appended to the registry.
    CardPrinted { card: Arc<Card> },
    /// The console status light changed.
    StatusChanged { status: Status },
    /// A drag ended and the card's placement was committed.
    CardMoved { id: CardId, placement: Placement },
}

/// Fan-out channel shared by the registry, console, and desk.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Deliver `event` to every live receiver. Returns how many there were;
    /// zero is not an error.
    pub fn emit(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Receive events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Origin;

    fn card() -> Arc<Card> {
        Arc::new(Card::new("ping", Origin::Manual, Placement::DEFAULT))
    }

    #[tokio::test]
    async fn printed_card_reaches_listener() {
        let bus = EventBus::default();
        let mut listener = bus.subscribe();

        let printed = card();
        bus.emit(Event::CardPrinted {
            card: Arc::clone(&printed),
        });

        match listener.recv().await.unwrap() {
            Event::CardPrinted { card } => assert_eq!(card.id(), printed.id()),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_listener_sees_status_changes() {
        let bus = EventBus::default();
        let mut front = bus.subscribe();
        let mut log = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        bus.emit(Event::StatusChanged {
            status: Status::Uplinking,
        });

        for rx in [&mut front, &mut log] {
            assert!(matches!(
                rx.recv().await.unwrap(),
                Event::StatusChanged {
                    status: Status::Uplinking
                }
            ));
        }
    }

    #[test]
    fn nobody_listening_is_fine() {
        let bus = EventBus::default();
        let delivered = bus.emit(Event::StatusChanged {
            status: Status::Ready,
        });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn late_listener_misses_earlier_events() {
        let bus = EventBus::default();
        bus.emit(Event::CardPrinted { card: card() });

        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn slow_listener_lags_instead_of_blocking() {
        let bus = EventBus::with_capacity(2);
        let mut slow = bus.subscribe();
        for _ in 0..5 {
            bus.emit(Event::CardPrinted { card: card() });
        }
        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert!(slow.recv().await.is_ok());
    }
}
