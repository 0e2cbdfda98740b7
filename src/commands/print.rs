use async_trait::async_trait;

use super::{Command, CommandResult, Session};
use crate::console::Commit;
use crate::render::status_line;

pub struct PrintCommand;

#[async_trait]
impl Command for PrintCommand {
    fn name(&self) -> &str {
        "/print"
    }

    fn usage(&self) -> &str {
        "[text]"
    }

    fn description(&self) -> &str {
        "print the pending text as typed"
    }

    async fn execute(&self, args: &str, session: &mut Session<'_>) -> CommandResult {
        if !args.is_empty() {
            session.console.set_input(args);
        }
        report(session.console.print())
    }
}

pub struct FixCommand;

#[async_trait]
impl Command for FixCommand {
    fn name(&self) -> &str {
        "/fix"
    }

    fn usage(&self) -> &str {
        "[text]"
    }

    fn description(&self) -> &str {
        "reword the pending text over the uplink, then print"
    }

    async fn execute(&self, args: &str, session: &mut Session<'_>) -> CommandResult {
        if !args.is_empty() {
            session.console.set_input(args);
        }
        match session.console.spawn_fix() {
            Ok(handle) => {
                let console = session.console;
                println!("  {}", status_line(console.status(), console.char_count()));
                CommandResult::Uplink(handle)
            }
            Err(commit) => report(commit),
        }
    }
}

fn report(commit: Commit) -> CommandResult {
    match commit {
        Commit::Printed(card) => CommandResult::Printed(card),
        Commit::Blank => {
            println!("  nothing to print");
            CommandResult::Handled
        }
        Commit::Busy => {
            println!("  uplink busy");
            CommandResult::Handled
        }
    }
}
