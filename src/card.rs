//! The printed card and its placement.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rand::RngExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DROP_MAX_Y, DROP_MIN_Y, JITTER_RATIO, MAX_TILT_DEGREES};
use crate::surface::{Bounds, CardSize};

/// Opaque card identity. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId(Uuid);

impl CardId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short label printed in the card footer: the last four hex digits.
    pub fn job_number(&self) -> String {
        let hex = self.0.simple().to_string();
        hex[hex.len() - 4..].to_string()
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Which commit action produced a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Manual,
    Enhanced,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Manual => write!(f, "manual"),
            Origin::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// Where a card sits on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub offset_x: f64,
    pub offset_y: f64,
    pub rotation_degrees: f64,
}

impl Placement {
    /// Used when the surface has not been measured yet.
    pub const DEFAULT: Placement = Placement {
        offset_x: 0.0,
        offset_y: 200.0,
        rotation_degrees: 0.0,
    };

    /// Drop a card somewhere below the paper slot: centered horizontal
    /// jitter over 40% of the width, a fixed vertical band, slight tilt.
    pub fn scatter<R: RngExt + ?Sized>(bounds: Option<Bounds>, rng: &mut R) -> Self {
        let Some(bounds) = bounds.filter(Bounds::is_finite) else {
            return Self::DEFAULT;
        };
        let half = bounds.width * JITTER_RATIO;
        Self {
            offset_x: rng.random_range(-half..=half),
            offset_y: rng.random_range(DROP_MIN_Y..=DROP_MAX_Y),
            rotation_degrees: rng.random_range(-MAX_TILT_DEGREES..=MAX_TILT_DEGREES),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.offset_x.is_finite() && self.offset_y.is_finite() && self.rotation_degrees.is_finite()
    }

    /// Same rotation, position shifted by `(dx, dy)`.
    pub fn shifted(self, dx: f64, dy: f64) -> Self {
        Self {
            offset_x: self.offset_x + dx,
            offset_y: self.offset_y + dy,
            ..self
        }
    }

    /// Clamp the position so the whole card footprint stays on the surface.
    /// A card larger than the surface is pinned to the center / top edge,
    /// and a non-finite coordinate is pinned there too.
    pub fn constrained(self, bounds: Bounds, card: CardSize) -> Self {
        let pin = |v: f64| if v.is_nan() { 0.0 } else { v };
        let max_x = ((bounds.width - card.width) / 2.0).max(0.0);
        let max_y = (bounds.height - card.height).max(0.0);
        Self {
            offset_x: pin(self.offset_x).clamp(-max_x, max_x),
            offset_y: pin(self.offset_y).clamp(0.0, max_y),
            ..self
        }
    }
}

/// A printed card. Everything but the placement is fixed at creation.
#[derive(Debug)]
pub struct Card {
    id: CardId,
    text: String,
    created_at: String,
    origin: Origin,
    placement: Mutex<Placement>,
}

impl Card {
    pub fn new(text: impl Into<String>, origin: Origin, placement: Placement) -> Self {
        Self {
            id: CardId::new(),
            text: text.into(),
            created_at: chrono::Local::now().format("%H:%M:%S").to_string(),
            origin,
            placement: Mutex::new(placement),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn placement(&self) -> Placement {
        *self.placement.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Only the card's own controller moves it.
    pub(crate) fn set_placement(&self, placement: Placement) {
        *self.placement.lock().unwrap_or_else(PoisonError::into_inner) = placement;
    }
}
