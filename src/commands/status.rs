use async_trait::async_trait;

use super::{Command, CommandResult, Session};
use crate::render::status_line;

pub struct StatusCommand;

#[async_trait]
impl Command for StatusCommand {
    fn name(&self) -> &str {
        "/status"
    }

    fn description(&self) -> &str {
        "show the status light, counter, and pending text"
    }

    async fn execute(&self, _args: &str, session: &mut Session<'_>) -> CommandResult {
        let console = session.console;
        println!("  {}", status_line(console.status(), console.char_count()));
        let input = console.input();
        if !input.is_empty() {
            println!("  > {input}");
        }
        CommandResult::Handled
    }
}

pub struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &str {
        "/clear"
    }

    fn description(&self) -> &str {
        "discard the pending text"
    }

    async fn execute(&self, _args: &str, session: &mut Session<'_>) -> CommandResult {
        session.console.clear_input();
        println!("  {}", status_line(session.console.status(), 0));
        CommandResult::Handled
    }
}
