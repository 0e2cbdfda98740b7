//! Slash commands for the beeper REPL.
//!
//! Each command is a small [`Command`] impl. The [`CommandRegistry`] owns
//! them, resolves names and aliases, and builds `/help` from what is
//! registered. A line that is not a command becomes the pending text.

mod cards;
mod drag;
mod help;
mod print;
mod quit;
mod status;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::card::Card;
use crate::console::{Commit, Console};
use crate::desk::Desk;

/// What a command can reach while it runs.
pub struct Session<'a> {
    pub console: &'a Arc<Console>,
    pub desk: &'a mut Desk,
}

/// Outcome of one REPL line.
#[derive(Debug)]
pub enum CommandResult {
    /// Plain text: the REPL stores it as the pending input.
    NotACommand,
    /// Done, prompt again.
    Handled,
    /// A card came out of the slot; the REPL plays its reveal.
    Printed(Arc<Card>),
    /// An uplink is open in the background; the REPL reports its card
    /// when the handle resolves.
    Uplink(JoinHandle<Commit>),
    /// Power down.
    Quit,
}

#[async_trait]
pub trait Command: Send + Sync {
    /// Trigger including the slash, e.g. `"/print"`.
    fn name(&self) -> &str;

    /// Extra triggers, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Argument synopsis shown in help, e.g. `"<job> <dx> <dy>"`.
    fn usage(&self) -> &str {
        ""
    }

    fn description(&self) -> &str;

    /// `args` is the rest of the line after the trigger, trimmed.
    async fn execute(&self, args: &str, session: &mut Session<'_>) -> CommandResult;
}

pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// All built-in commands, in help order.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(print::PrintCommand),
            Arc::new(print::FixCommand),
            Arc::new(cards::CardsCommand),
            Arc::new(cards::DeskCommand),
            Arc::new(drag::DragCommand),
            Arc::new(status::StatusCommand),
            Arc::new(status::ClearCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// The command answering to `trigger`, by name or alias.
    pub fn find(&self, trigger: &str) -> Option<&Arc<dyn Command>> {
        self.commands
            .iter()
            .find(|c| c.name() == trigger || c.aliases().contains(&trigger))
    }

    /// Run the command named on `line`. Unknown slash words are reported
    /// and swallowed; anything else is [`CommandResult::NotACommand`].
    pub async fn dispatch(&self, line: &str, session: &mut Session<'_>) -> CommandResult {
        let line = line.trim();
        let (trigger, args) = match line.split_once(char::is_whitespace) {
            Some((trigger, rest)) => (trigger, rest.trim()),
            None => (line, ""),
        };

        match self.find(trigger) {
            // help lists the registry, so it is answered here
            Some(command) if command.name() == "/help" => {
                print!("{}", self.help_text());
                CommandResult::Handled
            }
            Some(command) => command.execute(args, session).await,
            None if trigger.starts_with('/') => {
                eprintln!("  ✗ unknown command: {trigger} (try /help)");
                CommandResult::Handled
            }
            None => CommandResult::NotACommand,
        }
    }

    /// Two aligned columns: trigger with usage and aliases, description.
    pub fn help_text(&self) -> String {
        let rows: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.usage(), c.aliases()), c.description()))
            .collect();
        let width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        rows.iter()
            .map(|(label, desc)| format!("  {label:<width$}  {desc}\n"))
            .collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Every name and alias, in registration order.
    pub fn all_triggers(&self) -> Vec<&str> {
        self.commands
            .iter()
            .flat_map(|c| std::iter::once(c.name()).chain(c.aliases().iter().copied()))
            .collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(name: &str, usage: &str, aliases: &[&str]) -> String {
    let mut label = name.to_string();
    if !usage.is_empty() {
        label = format!("{label} {usage}");
    }
    if !aliases.is_empty() {
        label = format!("{label} ({})", aliases.join(", "));
    }
    label
}
