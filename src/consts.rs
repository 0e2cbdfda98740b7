//! Project-wide constants.

use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Default Gemini model when none is specified.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL of the Gemini REST API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// The single credential the process reads from its environment.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Soft cap the rewrite prompt asks the model to stay under.
pub const REWRITE_CHAR_LIMIT: usize = 200;

/// Time between revealed characters.
pub const REVEAL_INTERVAL: Duration = Duration::from_millis(40);

/// Horizontal jitter as a fraction of surface width, each side of center.
pub const JITTER_RATIO: f64 = 0.2;

/// Vertical drop zone below the console, in surface units.
pub const DROP_MIN_Y: f64 = 150.0;
pub const DROP_MAX_Y: f64 = 350.0;

/// Maximum tilt either way, in degrees.
pub const MAX_TILT_DEGREES: f64 = 5.0;

/// Default surface size, in surface units.
pub const DEFAULT_SURFACE_WIDTH: f64 = 1280.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 800.0;

/// Footprint of a printed card, in surface units.
pub const CARD_WIDTH: f64 = 256.0;
pub const CARD_HEIGHT: f64 = 160.0;

/// Emphasis applied while a card is being dragged.
pub const DRAG_SCALE: f64 = 1.05;
pub const DRAG_TILT_DEGREES: f64 = 2.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!AUTHOR.is_empty());
        assert!(!HOMEPAGE.is_empty());
        assert!(!REPO.is_empty());
        assert!(!DEFAULT_MODEL.is_empty());
        assert!(!API_KEY_ENV.is_empty());
    }

    #[test]
    fn consts_from_cargo_toml() {
        assert!(AUTHOR.contains("Assaf Sapir"));
        assert!(HOMEPAGE.contains("sapir.io"));
        assert!(REPO.contains("github.com/assapir/beeper"));
    }

    #[test]
    fn drop_zone_is_ordered() {
        assert!(DROP_MIN_Y < DROP_MAX_Y);
        assert!(JITTER_RATIO > 0.0 && JITTER_RATIO < 0.5);
    }
}
