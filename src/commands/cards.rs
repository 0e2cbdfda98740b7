use async_trait::async_trait;

use super::{Command, CommandResult, Session};
use crate::controller::{CardController, RevealState};
use crate::render::render_desk;

/// Columns and rows of the `/desk` map.
const MAP_COLUMNS: usize = 64;
const MAP_ROWS: usize = 16;

/// Longest text preview in the `/cards` listing.
const PREVIEW_CHARS: usize = 32;

pub struct CardsCommand;

#[async_trait]
impl Command for CardsCommand {
    fn name(&self) -> &str {
        "/cards"
    }

    fn aliases(&self) -> &[&str] {
        &["/ls"]
    }

    fn description(&self) -> &str {
        "list printed cards"
    }

    async fn execute(&self, _args: &str, session: &mut Session<'_>) -> CommandResult {
        session.desk.sync();
        if session.desk.is_empty() {
            println!("  no cards printed yet");
            return CommandResult::Handled;
        }
        for controller in session.desk.controllers() {
            println!("  {}", describe(controller));
        }
        CommandResult::Handled
    }
}

pub struct DeskCommand;

#[async_trait]
impl Command for DeskCommand {
    fn name(&self) -> &str {
        "/desk"
    }

    fn description(&self) -> &str {
        "show where cards lie on the desk"
    }

    async fn execute(&self, _args: &str, session: &mut Session<'_>) -> CommandResult {
        session.desk.sync();
        println!("{}", render_desk(session.desk, MAP_COLUMNS, MAP_ROWS));
        CommandResult::Handled
    }
}

/// One listing line: job, time, origin, position, reveal state, preview.
fn describe(controller: &CardController) -> String {
    let card = controller.card();
    let p = controller.position();
    let state = match controller.reveal().state() {
        RevealState::Revealing => "printing",
        RevealState::Settled => "settled",
    };
    let mut preview: String = card.text().chars().take(PREVIEW_CHARS).collect();
    if card.text().chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    format!(
        "#{} {} {:<8} ({:>7.1}, {:>6.1}, {:>4.1}°) {:<8} {}",
        card.id().job_number(),
        card.created_at(),
        card.origin().to_string(),
        p.offset_x,
        p.offset_y,
        p.rotation_degrees,
        state,
        preview.replace('\n', " "),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::card::{Card, Origin, Placement};
    use crate::status::StatusLight;
    use crate::surface::CardSize;

    #[tokio::test]
    async fn describe_includes_job_and_origin() {
        let card = Arc::new(Card::new("", Origin::Enhanced, Placement::DEFAULT));
        let job = card.id().job_number();
        let controller = CardController::new(
            card,
            Duration::from_millis(40),
            CardSize::default(),
            &StatusLight::new(),
        );
        let line = describe(&controller);
        assert!(line.starts_with(&format!("#{job}")));
        assert!(line.contains("enhanced"));
        assert!(line.contains("settled"));
    }

    #[tokio::test]
    async fn describe_truncates_long_text() {
        let text = "x".repeat(100);
        let card = Arc::new(Card::new(text, Origin::Manual, Placement::DEFAULT));
        let controller = CardController::new(
            card,
            Duration::from_millis(40),
            CardSize::default(),
            &StatusLight::new(),
        );
        let line = describe(&controller);
        assert!(line.ends_with('…'));
        assert!(line.contains("printing"));
    }
}
