//! The beeper itself: a pending-text buffer, a status light, and two
//! buttons.
//!
//! `print` commits the buffer as typed. `fix_and_print` sends it through
//! the [`Gateway`] first; while that uplink is open, a second `fix_and_print`
//! is refused with [`Commit::Busy`] but everything else keeps working.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::card::{Card, Origin};
use crate::gateway::Gateway;
use crate::registry::CardRegistry;
use crate::status::Uplink;
use crate::surface::Surface;

pub use crate::status::{Status, StatusLight};

/// What a commit action did.
#[derive(Debug, Clone)]
pub enum Commit {
    /// A card was printed.
    Printed(Arc<Card>),
    /// Nothing to print.
    Blank,
    /// A fix is already in flight.
    Busy,
}

impl Commit {
    pub fn card(&self) -> Option<&Arc<Card>> {
        match self {
            Commit::Printed(card) => Some(card),
            Commit::Blank | Commit::Busy => None,
        }
    }
}

pub struct Console {
    gateway: Gateway,
    registry: Arc<CardRegistry>,
    surface: Arc<Surface>,
    light: StatusLight,
    input: Mutex<String>,
}

impl Console {
    pub fn new(gateway: Gateway, registry: Arc<CardRegistry>, surface: Arc<Surface>) -> Self {
        let light = StatusLight::publishing(registry.events().clone());
        Self {
            gateway,
            registry,
            surface,
            light,
            input: Mutex::new(String::new()),
        }
    }

    /// Share a light with the desk so revealing cards show `PRINTING...`.
    pub fn with_status_light(mut self, light: StatusLight) -> Self {
        self.light = light;
        self
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn registry(&self) -> &Arc<CardRegistry> {
        &self.registry
    }

    /// Replace the pending text.
    pub fn set_input(&self, text: impl Into<String>) {
        *self.lock_input() = text.into();
    }

    pub fn input(&self) -> String {
        self.lock_input().clone()
    }

    pub fn clear_input(&self) {
        self.lock_input().clear();
    }

    /// The `CHAR:` counter.
    pub fn char_count(&self) -> usize {
        self.lock_input().chars().count()
    }

    pub fn status(&self) -> Status {
        self.light.status()
    }

    /// Whether `fix_and_print` would be accepted right now.
    pub fn can_fix(&self) -> bool {
        !self.light.is_uplinking()
    }

    /// Print the pending text as typed and clear the buffer.
    pub fn print(&self) -> Commit {
        let text = {
            let mut input = self.lock_input();
            if input.trim().is_empty() {
                return Commit::Blank;
            }
            std::mem::take(&mut *input)
        };
        let card = self.registry.create_card(text, Origin::Manual, &*self.surface);
        Commit::Printed(card)
    }

    /// Send the pending text through the gateway and print the result.
    ///
    /// The buffer is cleared afterwards unless it was edited while the
    /// uplink was open.
    pub async fn fix_and_print(&self) -> Commit {
        let snapshot = self.input();
        if snapshot.trim().is_empty() {
            return Commit::Blank;
        }
        let Some(uplink) = self.light.open_uplink() else {
            debug!("fix & print ignored, uplink already open");
            return Commit::Busy;
        };
        self.finish_fix(snapshot, uplink).await
    }

    /// [`fix_and_print`](Self::fix_and_print) in the background.
    ///
    /// The pending text is taken and the uplink claimed before this returns,
    /// so later edits and a second fix see the uplink as open. `Blank` and
    /// `Busy` come back immediately as `Err`. Aborting the handle closes the
    /// uplink without printing.
    pub fn spawn_fix(self: &Arc<Self>) -> Result<JoinHandle<Commit>, Commit> {
        let snapshot = self.input();
        if snapshot.trim().is_empty() {
            return Err(Commit::Blank);
        }
        let Some(uplink) = self.light.open_uplink() else {
            debug!("fix & print ignored, uplink already open");
            return Err(Commit::Busy);
        };
        let console = Arc::clone(self);
        Ok(tokio::spawn(async move {
            console.finish_fix(snapshot, uplink).await
        }))
    }

    async fn finish_fix(&self, snapshot: String, uplink: Uplink) -> Commit {
        let text = self.gateway.transform(&snapshot).await;
        let card = self
            .registry
            .create_card(text, Origin::Enhanced, &*self.surface);

        {
            let mut input = self.lock_input();
            if *input == snapshot {
                input.clear();
            } else {
                info!("input edited during uplink, keeping it");
            }
        }
        drop(uplink);
        Commit::Printed(card)
    }

    fn lock_input(&self) -> std::sync::MutexGuard<'_, String> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockRewriter;
    use crate::surface::Bounds;

    fn console(gateway: Gateway) -> Console {
        Console::new(
            gateway,
            Arc::new(CardRegistry::new()),
            Arc::new(Surface::measured(Bounds::new(1280.0, 800.0))),
        )
    }

    #[test]
    fn char_count_counts_chars() {
        let c = console(Gateway::passthrough());
        c.set_input("né ✓ ");
        assert_eq!(c.char_count(), 5);
    }

    #[test]
    fn print_blank_is_noop() {
        let c = console(Gateway::passthrough());
        c.set_input("   \n ");
        assert!(matches!(c.print(), Commit::Blank));
        assert!(c.registry().is_empty());
        // the buffer is left alone
        assert_eq!(c.input(), "   \n ");
    }

    #[test]
    fn print_keeps_raw_text_and_clears() {
        let c = console(Gateway::passthrough());
        c.set_input("  meet at dock 7 ");
        let card = c.print().card().cloned().unwrap();
        assert_eq!(card.text(), "  meet at dock 7 ");
        assert_eq!(card.origin(), Origin::Manual);
        assert_eq!(c.input(), "");
        assert_eq!(c.char_count(), 0);
    }

    #[tokio::test]
    async fn fix_blank_is_noop() {
        let c = console(Gateway::passthrough());
        assert!(matches!(c.fix_and_print().await, Commit::Blank));
        assert!(c.registry().is_empty());
    }

    #[tokio::test]
    async fn fix_prints_enhanced_rewrite() {
        let c = console(Gateway::new(Arc::new(MockRewriter::replying(["DOCK 7. MIDNIGHT."]))));
        c.set_input("meet at dock 7");
        let card = c.fix_and_print().await.card().cloned().unwrap();
        assert_eq!(card.text(), "DOCK 7. MIDNIGHT.");
        assert_eq!(card.origin(), Origin::Enhanced);
        assert_eq!(c.input(), "");
        assert_eq!(c.status(), Status::Ready);
    }

    #[tokio::test]
    async fn uplink_flag_is_released_after_fix() {
        let c = console(Gateway::new(Arc::new(MockRewriter::failing())));
        c.set_input("hello there");
        c.fix_and_print().await;
        assert!(c.can_fix());
    }

    #[tokio::test]
    async fn spawn_fix_snapshots_input_before_returning() {
        let c = Arc::new(console(Gateway::passthrough()));
        c.set_input("hello there");

        let handle = c.spawn_fix().unwrap();
        c.set_input("next draft");

        let card = handle.await.unwrap().card().cloned().unwrap();
        assert_eq!(card.text(), "hello there");
        assert_eq!(card.origin(), Origin::Enhanced);
        assert_eq!(c.input(), "next draft");
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_fix_claims_the_uplink_immediately() {
        let rewriter = Arc::new(
            MockRewriter::replying(["FIRST."]).with_delay(std::time::Duration::from_secs(1)),
        );
        let c = Arc::new(console(Gateway::new(rewriter.clone())));
        c.set_input("first");

        let handle = c.spawn_fix().unwrap();
        assert_eq!(c.status(), Status::Uplinking);
        assert!(matches!(c.spawn_fix(), Err(Commit::Busy)));

        c.set_input("manual");
        assert_eq!(c.print().card().unwrap().origin(), Origin::Manual);

        assert_eq!(handle.await.unwrap().card().unwrap().text(), "FIRST.");
        assert_eq!(rewriter.calls(), 1);
        assert!(c.can_fix());
    }

    #[tokio::test]
    async fn spawn_fix_blank_is_refused() {
        let c = Arc::new(console(Gateway::passthrough()));
        c.set_input("  ");
        assert!(matches!(c.spawn_fix(), Err(Commit::Blank)));
        assert!(c.can_fix());
    }

    #[tokio::test]
    async fn aborted_spawn_fix_releases_the_uplink() {
        let rewriter =
            MockRewriter::replying(["late"]).with_delay(std::time::Duration::from_secs(60));
        let c = Arc::new(console(Gateway::new(Arc::new(rewriter))));
        c.set_input("cancel me");

        let handle = c.spawn_fix().unwrap();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        assert!(c.can_fix());
        assert!(c.registry().is_empty());
    }
}
