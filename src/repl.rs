//! The interactive loop.
//!
//! Reading input never waits on the uplink or on a card typing out. A fix
//! runs as its own task and its card is shown when it lands; a reveal plays
//! in the background and stops at the next line typed.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::card::Card;
use crate::commands::{CommandRegistry, CommandResult, Session};
use crate::console::{Commit, Console};
use crate::desk::Desk;
use crate::render::{play_reveal, status_line};
use crate::status::Status;

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    console: Arc<Console>,
    desk: Desk,
    commands: CommandRegistry,
    uplink: Option<JoinHandle<Commit>>,
    playback: Option<JoinHandle<io::Result<()>>>,
    playback_enabled: bool,
}

impl Repl {
    pub fn new(console: Arc<Console>, desk: Desk) -> Self {
        Self {
            console,
            desk,
            commands: CommandRegistry::new(),
            uplink: None,
            playback: None,
            playback_enabled: true,
        }
    }

    /// Don't stream reveals to stdout. Cards still reveal on the desk.
    pub fn without_playback(mut self) -> Self {
        self.playback_enabled = false;
        self
    }

    pub fn console(&self) -> &Arc<Console> {
        &self.console
    }

    pub fn desk(&self) -> &Desk {
        &self.desk
    }

    /// A fix is waiting on the uplink.
    pub fn is_uplinking(&self) -> bool {
        self.uplink.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Run one input line. Any reveal still playing is cut short first.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        self.stop_playback();
        if line.trim().is_empty() {
            return Flow::Continue;
        }

        let mut session = Session {
            console: &self.console,
            desk: &mut self.desk,
        };
        match self.commands.dispatch(line, &mut session).await {
            CommandResult::NotACommand => {
                self.console.set_input(line);
                println!(
                    "  {}",
                    status_line(self.console.status(), self.console.char_count())
                );
            }
            CommandResult::Handled => {}
            CommandResult::Printed(card) => self.show(card),
            CommandResult::Uplink(handle) => {
                // spawn_fix refuses a second uplink, so none is replaced here
                self.uplink = Some(handle);
            }
            CommandResult::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Wait for the open uplink, if any, and show its card.
    pub async fn finish_uplink(&mut self) {
        if let Some(handle) = self.uplink.take() {
            let result = handle.await;
            self.land(result);
        }
    }

    /// Cancel the uplink and any playback. `false` if nothing was running.
    pub fn interrupt(&mut self) -> bool {
        let mut any = false;
        if let Some(handle) = self.uplink.take() {
            handle.abort();
            any = true;
        }
        if let Some(handle) = self.playback.take() {
            any |= !handle.is_finished();
            handle.abort();
        }
        any
    }

    /// Read lines from `input` until EOF, `/quit` or Ctrl+C at an idle
    /// prompt. Ctrl+C while something is running cancels only that.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        let mut lines = input.lines();
        let mut prompt_due = true;

        loop {
            if prompt_due && self.playback.is_none() {
                print_prompt(self.console.status())?;
                prompt_due = false;
            }

            tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => {
                        prompt_due = true;
                        if self.handle_line(&line).await == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        // Ctrl+D (EOF): let the last fix land before leaving
                        println!();
                        self.finish_uplink().await;
                        if let Some(handle) = self.playback.take() {
                            finished(handle.await)?;
                        }
                        break;
                    }
                },
                result = wait(&mut self.uplink), if self.uplink.is_some() => {
                    self.uplink = None;
                    self.land(result);
                    prompt_due = true;
                }
                result = wait(&mut self.playback), if self.playback.is_some() => {
                    self.playback = None;
                    finished(result)?;
                    prompt_due = true;
                }
                _ = tokio::signal::ctrl_c() => {
                    if self.interrupt() {
                        println!("\n\ninterrupted");
                        prompt_due = true;
                    } else {
                        println!();
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn land(&mut self, result: Result<Commit, JoinError>) {
        match result {
            Ok(Commit::Printed(card)) => self.show(card),
            Ok(Commit::Blank) => println!("  nothing to print"),
            Ok(Commit::Busy) => println!("  uplink busy"),
            Err(e) if e.is_cancelled() => debug!("uplink cancelled"),
            Err(e) => warn!(error = %e, "uplink task failed"),
        }
    }

    /// Put a new card on the desk and start typing it out.
    fn show(&mut self, card: Arc<Card>) {
        self.desk.sync();
        if !self.playback_enabled {
            return;
        }
        self.stop_playback();
        if let Some(controller) = self.desk.controller(card.id()) {
            let frames = controller.reveal().subscribe();
            self.playback = Some(tokio::spawn(play_reveal(card, frames)));
        }
    }

    fn stop_playback(&mut self) {
        if let Some(handle) = self.playback.take()
            && !handle.is_finished()
        {
            handle.abort();
            println!();
        }
    }
}

fn print_prompt(status: Status) -> io::Result<()> {
    let mut out = io::stdout();
    match status {
        Status::Ready => write!(out, "\nbeeper> ")?,
        busy => write!(out, "\n[{busy}] beeper> ")?,
    }
    out.flush()
}

/// Resolves with the task's output, or never if there is no task.
async fn wait<T>(handle: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match handle {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

fn finished(result: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    match result {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}
