//! The status light and what drives it.
//!
//! The console holds the light while an uplink is open and every revealing
//! card holds it while it types out. The light derives one [`Status`] from
//! both and announces each change once on the event bus.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::events::{Event, EventBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Ready,
    Uplinking,
    Printing,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(f, "READY"),
            Status::Uplinking => write!(f, "UPLINKING..."),
            Status::Printing => write!(f, "PRINTING..."),
        }
    }
}

/// Shared handle to the status light. Clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct StatusLight {
    inner: Arc<Light>,
}

#[derive(Debug, Default)]
struct Light {
    uplinking: AtomicBool,
    revealing: AtomicUsize,
    /// Last status announced; guards against duplicate events.
    shown: Mutex<Status>,
    events: Option<EventBus>,
}

impl StatusLight {
    /// A light nobody is told about.
    pub fn new() -> Self {
        Self::default()
    }

    /// A light that announces every change on `events`.
    pub fn publishing(events: EventBus) -> Self {
        Self {
            inner: Arc::new(Light {
                events: Some(events),
                ..Light::default()
            }),
        }
    }

    /// Uplinking wins over printing.
    pub fn status(&self) -> Status {
        if self.is_uplinking() {
            Status::Uplinking
        } else if self.any_revealing() {
            Status::Printing
        } else {
            Status::Ready
        }
    }

    pub fn is_uplinking(&self) -> bool {
        self.inner.uplinking.load(Ordering::SeqCst)
    }

    /// Cards still typing out.
    pub fn revealing(&self) -> usize {
        self.inner.revealing.load(Ordering::SeqCst)
    }

    pub fn any_revealing(&self) -> bool {
        self.revealing() > 0
    }

    /// Claim the uplink, or `None` if one is already open.
    pub(crate) fn open_uplink(&self) -> Option<Uplink> {
        self.inner
            .uplinking
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.refresh();
        Some(Uplink {
            light: self.clone(),
        })
    }

    /// Count a card as revealing until the guard is dropped.
    pub(crate) fn enter_reveal(&self) -> ActiveReveal {
        self.inner.revealing.fetch_add(1, Ordering::SeqCst);
        self.refresh();
        ActiveReveal {
            light: self.clone(),
        }
    }

    fn refresh(&self) {
        let mut shown = self.inner.shown.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.status();
        if *shown == now {
            return;
        }
        *shown = now;
        debug!(status = %now, "status changed");
        if let Some(events) = &self.inner.events {
            events.emit(Event::StatusChanged { status: now });
        }
    }
}

/// Holds the uplink open. Dropping it (including when the owning future is
/// cancelled) re-enables fix & print.
#[derive(Debug)]
pub(crate) struct Uplink {
    light: StatusLight,
}

impl Drop for Uplink {
    fn drop(&mut self) {
        self.light.inner.uplinking.store(false, Ordering::SeqCst);
        self.light.refresh();
    }
}

/// One card's share of the printing light.
#[derive(Debug)]
pub(crate) struct ActiveReveal {
    light: StatusLight,
}

impl Drop for ActiveReveal {
    fn drop(&mut self) {
        self.light.inner.revealing.fetch_sub(1, Ordering::SeqCst);
        self.light.refresh();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::*;

    fn statuses(rx: &mut broadcast::Receiver<Event>) -> Vec<Status> {
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let Event::StatusChanged { status } = event {
                seen.push(status);
            }
        }
        seen
    }

    #[test]
    fn labels() {
        assert_eq!(Status::Ready.to_string(), "READY");
        assert_eq!(Status::Uplinking.to_string(), "UPLINKING...");
        assert_eq!(Status::Printing.to_string(), "PRINTING...");
    }

    #[test]
    fn starts_ready() {
        let light = StatusLight::new();
        assert_eq!(light.status(), Status::Ready);
        assert!(!light.is_uplinking());
        assert_eq!(light.revealing(), 0);
    }

    #[test]
    fn only_one_uplink_at_a_time() {
        let light = StatusLight::new();
        let first = light.open_uplink();
        assert!(first.is_some());
        assert!(light.open_uplink().is_none());

        drop(first);
        assert!(light.open_uplink().is_some());
    }

    #[test]
    fn uplinking_outranks_printing() {
        let light = StatusLight::new();
        let _reveal = light.enter_reveal();
        assert_eq!(light.status(), Status::Printing);

        let uplink = light.open_uplink();
        assert_eq!(light.status(), Status::Uplinking);

        drop(uplink);
        assert_eq!(light.status(), Status::Printing);
    }

    #[test]
    fn each_change_is_announced_once() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let light = StatusLight::publishing(bus.clone());

        let a = light.enter_reveal();
        let b = light.enter_reveal();
        drop(a);
        drop(b);

        assert_eq!(statuses(&mut rx), [Status::Printing, Status::Ready]);
    }

    #[test]
    fn uplink_during_reveal_is_announced() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let light = StatusLight::publishing(bus.clone());

        let reveal = light.enter_reveal();
        let uplink = light.open_uplink();
        drop(uplink);
        drop(reveal);

        assert_eq!(
            statuses(&mut rx),
            [
                Status::Printing,
                Status::Uplinking,
                Status::Printing,
                Status::Ready
            ]
        );
    }

    #[test]
    fn clones_share_state() {
        let light = StatusLight::new();
        let other = light.clone();
        let _reveal = other.enter_reveal();
        assert!(light.any_revealing());
    }
}
