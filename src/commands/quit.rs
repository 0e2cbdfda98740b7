use async_trait::async_trait;

use super::{Command, CommandResult, Session};

pub struct QuitCommand;

#[async_trait]
impl Command for QuitCommand {
    fn name(&self) -> &str {
        "/quit"
    }

    fn aliases(&self) -> &[&str] {
        &["quit", "exit", "/exit"]
    }

    fn description(&self) -> &str {
        "power down"
    }

    async fn execute(&self, _args: &str, _session: &mut Session<'_>) -> CommandResult {
        CommandResult::Quit
    }
}
