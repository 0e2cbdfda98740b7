//! The append-only card registry.
//!
//! One writer, many readers: cards are only ever pushed onto the end, and
//! every push is announced on the [`EventBus`] after the write lock is
//! released, so a subscriber that reacts by taking a [`snapshot`] always
//! sees the new card.
//!
//! [`snapshot`]: CardRegistry::snapshot

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use tracing::info;

use crate::card::{Card, CardId, Origin, Placement};
use crate::events::{Event, EventBus};
use crate::surface::BoundsProvider;

/// Owns every card printed this session, in print order.
#[derive(Debug, Default)]
pub struct CardRegistry {
    cards: RwLock<Vec<Arc<Card>>>,
    events: EventBus,
}

impl CardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a card with a fresh id and a scattered initial placement,
    /// append it, and announce it.
    pub fn create_card(
        &self,
        text: impl Into<String>,
        origin: Origin,
        bounds: &dyn BoundsProvider,
    ) -> Arc<Card> {
        let placement = Placement::scatter(bounds.bounds(), &mut rand::rng());
        let card = Arc::new(Card::new(text, origin, placement));

        self.cards
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&card));

        info!(
            id = %card.id(),
            %origin,
            x = placement.offset_x,
            y = placement.offset_y,
            "card printed"
        );
        self.events.emit(Event::CardPrinted {
            card: Arc::clone(&card),
        });
        card
    }

    /// All cards in print order.
    pub fn snapshot(&self) -> Vec<Arc<Card>> {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cards appended after the first `skip` (used by observers catching up).
    pub fn since(&self, skip: usize) -> Vec<Arc<Card>> {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .skip(skip)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: CardId) -> Option<Arc<Card>> {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| c.id() == id)
            .cloned()
    }

    /// Look a card up by the short job number shown in its footer.
    /// The most recent match wins if two ids share a tail.
    pub fn find_job(&self, job: &str) -> Option<Arc<Card>> {
        let job = job.trim().trim_start_matches('#').to_ascii_lowercase();
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|c| c.id().job_number() == job)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.cards.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}
