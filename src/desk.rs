//! The desk: the presentation layer that watches the registry and keeps
//! one [`CardController`] per printed card.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::card::{Card, CardId, Placement};
use crate::controller::CardController;
use crate::events::Event;
use crate::registry::CardRegistry;
use crate::status::StatusLight;
use crate::surface::{BoundsProvider, CardSize, Point, Surface};

pub struct Desk {
    registry: Arc<CardRegistry>,
    surface: Arc<Surface>,
    controllers: Vec<CardController>,
    interval: Duration,
    card_size: CardSize,
    light: StatusLight,
    next_raise: u64,
}

impl Desk {
    pub fn new(registry: Arc<CardRegistry>, surface: Arc<Surface>, interval: Duration) -> Self {
        let light = StatusLight::publishing(registry.events().clone());
        Self {
            registry,
            surface,
            controllers: Vec::new(),
            interval,
            card_size: CardSize::default(),
            light,
            next_raise: 0,
        }
    }

    pub fn with_card_size(mut self, card_size: CardSize) -> Self {
        self.card_size = card_size;
        self
    }

    /// The light revealing cards keep on PRINTING; share it with the
    /// console so both drive one status.
    pub fn status_light(&self) -> StatusLight {
        self.light.clone()
    }

    pub fn surface(&self) -> &Arc<Surface> {
        &self.surface
    }

    /// Pick up every card appended since the last sync and start its
    /// controller. Returns the new cards in print order.
    pub fn sync(&mut self) -> Vec<Arc<Card>> {
        let fresh = self.registry.since(self.controllers.len());
        for card in &fresh {
            debug!(id = %card.id(), "controller attached");
            self.controllers.push(CardController::new(
                Arc::clone(card),
                self.interval,
                self.card_size,
                &self.light,
            ));
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn controllers(&self) -> &[CardController] {
        &self.controllers
    }

    pub fn controller(&self, id: CardId) -> Option<&CardController> {
        self.controllers.iter().find(|c| c.card().id() == id)
    }

    fn controller_mut(&mut self, id: CardId) -> Option<&mut CardController> {
        self.controllers.iter_mut().find(|c| c.card().id() == id)
    }

    /// Pick a card up. Returns `false` for an unknown id.
    pub fn begin_drag(&mut self, id: CardId, pointer: Point) -> bool {
        self.next_raise += 1;
        let stamp = self.next_raise;
        match self.controller_mut(id) {
            Some(c) => {
                c.begin_drag(pointer, stamp);
                true
            }
            None => false,
        }
    }

    pub fn drag_to(&mut self, id: CardId, pointer: Point) -> Option<Placement> {
        let bounds = self.surface.bounds();
        self.controller_mut(id)?.drag_to(pointer, bounds)
    }

    /// Drop a held card and announce its new placement.
    pub fn end_drag(&mut self, id: CardId) -> Option<Placement> {
        let placement = self.controller_mut(id)?.end_drag()?;
        self.registry
            .events()
            .emit(Event::CardMoved { id, placement });
        Some(placement)
    }

    /// A whole gesture: pick up at the origin, move by `(dx, dy)`, drop.
    pub fn nudge(&mut self, id: CardId, dx: f64, dy: f64) -> Option<Placement> {
        if !self.begin_drag(id, Point::default()) {
            return None;
        }
        self.drag_to(id, Point::new(dx, dy));
        self.end_drag(id)
    }

    /// Controllers back to front: never-raised cards in print order, then
    /// by how recently they were picked up.
    pub fn render_order(&self) -> Vec<&CardController> {
        let mut order: Vec<&CardController> = self.controllers.iter().collect();
        order.sort_by_key(|c| c.raised());
        order
    }

    pub fn any_revealing(&self) -> bool {
        self.light.any_revealing()
    }

    /// Wait for every attached card to finish revealing.
    pub async fn settled(&self) {
        futures::future::join_all(self.controllers.iter().map(|c| c.reveal().settled())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Origin;
    use crate::controller::RevealState;
    use crate::surface::Bounds;

    fn desk() -> (Arc<CardRegistry>, Desk) {
        let registry = Arc::new(CardRegistry::new());
        let surface = Arc::new(Surface::measured(Bounds::new(1000.0, 800.0)));
        let desk = Desk::new(Arc::clone(&registry), surface, Duration::from_millis(40));
        (registry, desk)
    }

    #[tokio::test]
    async fn sync_attaches_new_cards_once() {
        let (registry, mut desk) = desk();
        registry.create_card("one", Origin::Manual, &None::<Bounds>);
        registry.create_card("two", Origin::Manual, &None::<Bounds>);

        let fresh = desk.sync();
        assert_eq!(fresh.len(), 2);
        assert_eq!(desk.len(), 2);

        assert!(desk.sync().is_empty());

        registry.create_card("three", Origin::Manual, &None::<Bounds>);
        let fresh = desk.sync();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].text(), "three");
        assert_eq!(desk.controllers()[2].card().text(), "three");
    }

    #[tokio::test]
    async fn unknown_card_cannot_be_dragged() {
        let (_registry, mut desk) = desk();
        assert!(!desk.begin_drag(CardId::new(), Point::default()));
        assert!(desk.nudge(CardId::new(), 1.0, 1.0).is_none());
    }

    #[tokio::test]
    async fn end_drag_emits_card_moved() {
        let (registry, mut desk) = desk();
        let card = registry.create_card("x", Origin::Manual, &None::<Bounds>);
        desk.sync();
        let mut rx = registry.subscribe();

        let placement = desk.nudge(card.id(), 25.0, 0.0).unwrap();

        match rx.recv().await.unwrap() {
            Event::CardMoved { id, placement: p } => {
                assert_eq!(id, card.id());
                assert_eq!(p, placement);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    fn render_texts(desk: &Desk) -> Vec<String> {
        desk.render_order()
            .into_iter()
            .map(|c| c.card().text().to_string())
            .collect()
    }

    #[tokio::test]
    async fn most_recently_dragged_renders_last() {
        let (registry, mut desk) = desk();
        let a = registry.create_card("a", Origin::Manual, &None::<Bounds>);
        let b = registry.create_card("b", Origin::Manual, &None::<Bounds>);
        registry.create_card("c", Origin::Manual, &None::<Bounds>);
        desk.sync();

        desk.nudge(a.id(), 1.0, 1.0);
        assert_eq!(render_texts(&desk), ["b", "c", "a"]);

        desk.nudge(b.id(), 1.0, 1.0);
        assert_eq!(render_texts(&desk), ["c", "a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn settled_waits_for_every_card() {
        let (registry, mut desk) = desk();
        registry.create_card("short", Origin::Manual, &None::<Bounds>);
        registry.create_card("a bit longer", Origin::Enhanced, &None::<Bounds>);
        desk.sync();
        assert!(desk.any_revealing());

        desk.settled().await;
        for c in desk.controllers() {
            assert_eq!(c.reveal().state(), RevealState::Settled);
        }
    }
}
