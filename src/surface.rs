//! The surface cards are dropped onto, and the geometry that lives on it.
//!
//! Coordinates follow the paper slot: `x` is measured from the horizontal
//! center of the surface, `y` from its top edge.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::consts::{CARD_HEIGHT, CARD_WIDTH};

/// Measured size of the surface, in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Negative or NaN dimensions collapse to zero.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// An infinite surface cannot be sampled for placement.
    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// A pointer position on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Footprint of a card on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CardSize {
    fn default() -> Self {
        Self {
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
        }
    }
}

/// Anything that can report the current surface size.
///
/// `None` means the surface has not been measured yet.
pub trait BoundsProvider {
    fn bounds(&self) -> Option<Bounds>;
}

impl BoundsProvider for Bounds {
    fn bounds(&self) -> Option<Bounds> {
        Some(*self)
    }
}

impl BoundsProvider for Option<Bounds> {
    fn bounds(&self) -> Option<Bounds> {
        *self
    }
}

/// A resizable surface shared between the console and the desk.
#[derive(Debug, Default)]
pub struct Surface {
    bounds: RwLock<Option<Bounds>>,
}

impl Surface {
    /// A surface that has not been measured yet.
    pub fn unmeasured() -> Self {
        Self::default()
    }

    pub fn measured(bounds: Bounds) -> Self {
        Self {
            bounds: RwLock::new(Some(bounds)),
        }
    }

    /// Record a new measurement (e.g. after a terminal resize).
    pub fn resize(&self, bounds: Bounds) {
        *self.bounds.write().unwrap_or_else(PoisonError::into_inner) = Some(bounds);
    }
}

impl BoundsProvider for Surface {
    fn bounds(&self) -> Option<Bounds> {
        *self.bounds.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_bounds_collapse_to_zero() {
        let b = Bounds::new(-10.0, 20.0);
        assert_eq!(b.width, 0.0);
        assert_eq!(b.height, 20.0);
    }

    #[test]
    fn infinite_bounds_are_not_finite() {
        assert!(Bounds::new(1280.0, 800.0).is_finite());
        assert!(!Bounds::new(f64::INFINITY, 800.0).is_finite());
        assert!(!Bounds::new(1280.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn unmeasured_surface_has_no_bounds() {
        assert!(Surface::unmeasured().bounds().is_none());
        assert!(None::<Bounds>.bounds().is_none());
    }

    #[test]
    fn resize_updates_bounds() {
        let surface = Surface::unmeasured();
        surface.resize(Bounds::new(800.0, 600.0));
        assert_eq!(surface.bounds(), Some(Bounds::new(800.0, 600.0)));

        surface.resize(Bounds::new(1024.0, 768.0));
        assert_eq!(surface.bounds().unwrap().width, 1024.0);
    }

    #[test]
    fn default_card_size_is_positive() {
        let size = CardSize::default();
        assert!(size.width > 0.0);
        assert!(size.height > 0.0);
    }
}
