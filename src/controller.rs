//! Per-card presentation: the typewriter reveal and drag handling.
//!
//! Every card gets its own [`CardController`]. The reveal runs as an owned
//! background task that is aborted when the controller is dropped. Drags
//! touch only the controller's own card.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::debug;

use crate::card::{Card, Placement};
use crate::consts::{DRAG_SCALE, DRAG_TILT_DEGREES};
use crate::status::StatusLight;
use crate::surface::{Bounds, CardSize, Point};

/// Reveal progress of a single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Revealing,
    Settled,
}

/// Progressive disclosure of a card's text, one character per tick.
#[derive(Debug, Clone)]
pub struct Reveal {
    text: String,
    total: usize,
    shown: usize,
}

impl Reveal {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let total = text.chars().count();
        Self {
            text,
            total,
            shown: 0,
        }
    }

    /// Show one more character. Does nothing once settled.
    pub fn tick(&mut self) -> RevealState {
        if self.shown < self.total {
            self.shown += 1;
        }
        self.state()
    }

    pub fn state(&self) -> RevealState {
        if self.shown >= self.total {
            RevealState::Settled
        } else {
            RevealState::Revealing
        }
    }

    /// The prefix revealed so far.
    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    /// Characters revealed so far.
    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn frame(&self) -> RevealFrame {
        RevealFrame {
            visible: self.visible().to_string(),
            state: self.state(),
        }
    }
}

/// What the renderer draws for a card at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealFrame {
    pub visible: String,
    pub state: RevealState,
}

impl RevealFrame {
    /// The typing cursor is shown only while revealing.
    pub fn cursor_visible(&self) -> bool {
        self.state == RevealState::Revealing
    }
}

/// The background task that ticks a [`Reveal`] forward.
///
/// Dropping it aborts the task, so no timer outlives its card.
pub struct RevealTask {
    handle: Option<JoinHandle<()>>,
    frames: watch::Receiver<RevealFrame>,
}

impl RevealTask {
    /// Start revealing `text`, one character every `interval`.
    /// The first character appears after one full interval. The card keeps
    /// `light` on PRINTING until it settles or the task is dropped.
    pub fn start(text: &str, interval: Duration, light: &StatusLight) -> Self {
        let mut reveal = Reveal::new(text);
        let (tx, frames) = watch::channel(reveal.frame());

        if reveal.state() == RevealState::Settled {
            return Self {
                handle: None,
                frames,
            };
        }

        let active = light.enter_reveal();
        let handle = tokio::spawn(async move {
            let _active = active;
            let mut ticker = interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                let state = reveal.tick();
                tx.send_replace(reveal.frame());
                if state == RevealState::Settled {
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
            frames,
        }
    }

    /// Latest frame.
    pub fn frame(&self) -> RevealFrame {
        self.frames.borrow().clone()
    }

    pub fn state(&self) -> RevealState {
        self.frames.borrow().state
    }

    /// A receiver for renderers that want every change.
    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.frames.clone()
    }

    /// Wait until the text is fully shown. Returns the last frame seen if
    /// the task was cancelled first.
    pub async fn settled(&self) -> RevealFrame {
        let mut rx = self.frames.clone();
        let settled = match rx.wait_for(|f| f.state == RevealState::Settled).await {
            Ok(frame) => Some(frame.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| rx.borrow().clone())
    }

    /// Stop revealing where it is.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for RevealTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Transient emphasis applied while a card is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emphasis {
    pub elevated: bool,
    pub scale: f64,
    pub extra_rotation: f64,
}

impl Emphasis {
    pub const RESTING: Emphasis = Emphasis {
        elevated: false,
        scale: 1.0,
        extra_rotation: 0.0,
    };

    pub const HELD: Emphasis = Emphasis {
        elevated: true,
        scale: DRAG_SCALE,
        extra_rotation: DRAG_TILT_DEGREES,
    };
}

#[derive(Debug, Clone, Copy)]
enum DragState {
    Idle,
    Dragging {
        grab: Point,
        start: Placement,
        current: Placement,
    },
}

/// Drives one card: its reveal and its drags.
pub struct CardController {
    card: Arc<Card>,
    reveal: RevealTask,
    drag: DragState,
    card_size: CardSize,
    raised: u64,
}

impl CardController {
    pub fn new(
        card: Arc<Card>,
        interval: Duration,
        card_size: CardSize,
        light: &StatusLight,
    ) -> Self {
        let reveal = RevealTask::start(card.text(), interval, light);
        Self {
            card,
            reveal,
            drag: DragState::Idle,
            card_size,
            raised: 0,
        }
    }

    pub fn card(&self) -> &Arc<Card> {
        &self.card
    }

    pub fn reveal(&self) -> &RevealTask {
        &self.reveal
    }

    /// Where the card is drawn right now: the live drag position while
    /// held, the committed placement otherwise.
    pub fn position(&self) -> Placement {
        match self.drag {
            DragState::Dragging { current, .. } => current,
            DragState::Idle => self.card.placement(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn emphasis(&self) -> Emphasis {
        if self.is_dragging() {
            Emphasis::HELD
        } else {
            Emphasis::RESTING
        }
    }

    /// Z-order stamp: the higher, the more recently it was picked up.
    pub fn raised(&self) -> u64 {
        self.raised
    }

    /// Pick the card up at `pointer`. Picking up an already-held card
    /// restarts the drag from its live position.
    pub fn begin_drag(&mut self, pointer: Point, stamp: u64) {
        let start = self.position();
        self.drag = DragState::Dragging {
            grab: pointer,
            start,
            current: start,
        };
        self.raised = stamp;
        debug!(id = %self.card.id(), "drag start");
    }

    /// Move the held card so it follows `pointer`, kept on the surface.
    /// A pointer that would put the card at a non-finite spot is ignored.
    /// Returns the live position, or `None` if the card is not held.
    pub fn drag_to(&mut self, pointer: Point, bounds: Option<Bounds>) -> Option<Placement> {
        let DragState::Dragging {
            grab,
            start,
            current,
        } = self.drag
        else {
            return None;
        };
        let mut next = start.shifted(pointer.x - grab.x, pointer.y - grab.y);
        if !next.is_finite() {
            debug!(id = %self.card.id(), "ignoring non-finite pointer");
            return Some(current);
        }
        if let Some(bounds) = bounds {
            next = next.constrained(bounds, self.card_size);
        }
        self.drag = DragState::Dragging {
            grab,
            start,
            current: next,
        };
        Some(next)
    }

    /// Drop the card and commit its placement. No momentum is carried.
    pub fn end_drag(&mut self) -> Option<Placement> {
        let DragState::Dragging { current, .. } = self.drag else {
            return None;
        };
        self.card.set_placement(current);
        self.drag = DragState::Idle;
        debug!(id = %self.card.id(), x = current.offset_x, y = current.offset_y, "drag end");
        Some(current)
    }
}
