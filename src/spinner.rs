//! A signal-strength indicator shown on stderr while the uplink is open.

use std::io::Write;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::status::Status;

/// Signal bar frames, rising then falling.
const FRAMES: &[&str] = &["▁", "▂", "▃", "▅", "▇", "▅", "▃", "▂"];

/// Frame interval.
const INTERVAL: Duration = Duration::from_millis(90);

/// Runs in a background task until [`Spinner::stop`] is awaited.
/// Writes to stderr so card output on stdout stays clean.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: watch::Sender<bool>,
}

impl Spinner {
    /// Show `status` next to the animated bars, with elapsed seconds.
    pub fn start(status: Status) -> Self {
        let (cancel, mut cancel_rx) = watch::channel(false);
        let label = status.to_string();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut i = 0;
            loop {
                eprint!(
                    "\x1b[2K\r{} {label} {:.1}s",
                    frame(i),
                    started.elapsed().as_secs_f32()
                );
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancel_rx.changed() => break,
                }
                i += 1;
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self { handle, cancel }
    }

    /// Stop and clear the line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

fn frame(i: usize) -> &'static str {
    FRAMES[i % FRAMES.len()]
}
