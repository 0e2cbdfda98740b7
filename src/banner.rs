//! Startup banner and session summary display.

use crate::card::Origin;
use crate::consts::{AUTHOR, HOMEPAGE, REPO};
use crate::registry::CardRegistry;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub uplink: &'a str,
    pub surface: (f64, f64),
    pub cadence_ms: u128,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║          F I X   B E E P E R          ║
   ║         retro terminal system         ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   uplink    {}
   surface   {}x{}
   cadence   {}ms/char

   type a message, then /print or /fix. /help for more.
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.uplink,
        info.surface.0,
        info.surface.1,
        info.cadence_ms,
    );
}

/// Printed / enhanced counts for the session summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintTally {
    pub printed: usize,
    pub enhanced: usize,
}

impl PrintTally {
    pub fn from_registry(registry: &CardRegistry) -> Self {
        let cards = registry.snapshot();
        Self {
            printed: cards.len(),
            enhanced: cards
                .iter()
                .filter(|c| c.origin() == Origin::Enhanced)
                .count(),
        }
    }
}

/// Print the session summary (card tally + farewell).
pub fn print_session_summary(tally: PrintTally) {
    if tally.printed > 0 {
        println!(
            "session: {} card(s) printed, {} enhanced",
            tally.printed, tally.enhanced
        );
    }
    println!("end of transmission.");
}
