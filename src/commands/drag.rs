use async_trait::async_trait;

use super::{Command, CommandResult, Session};

pub struct DragCommand;

#[async_trait]
impl Command for DragCommand {
    fn name(&self) -> &str {
        "/drag"
    }

    fn aliases(&self) -> &[&str] {
        &["/mv"]
    }

    fn usage(&self) -> &str {
        "<job> <dx> <dy>"
    }

    fn description(&self) -> &str {
        "slide a card across the desk"
    }

    async fn execute(&self, args: &str, session: &mut Session<'_>) -> CommandResult {
        let Some((job, dx, dy)) = parse_args(args) else {
            eprintln!("  ✗ usage: /drag <job> <dx> <dy>");
            return CommandResult::Handled;
        };

        session.desk.sync();
        let Some(card) = session.console.registry().find_job(job) else {
            eprintln!("  ✗ no card with job #{}", job.trim_start_matches('#'));
            return CommandResult::Handled;
        };

        match session.desk.nudge(card.id(), dx, dy) {
            Some(p) => println!(
                "  ✓ #{} now at ({:.1}, {:.1})",
                card.id().job_number(),
                p.offset_x,
                p.offset_y
            ),
            None => eprintln!("  ✗ card is not on the desk"),
        }
        CommandResult::Handled
    }
}

fn parse_args(args: &str) -> Option<(&str, f64, f64)> {
    let mut parts = args.split_whitespace();
    let job = parts.next()?;
    let dx: f64 = parts.next()?.parse().ok()?;
    let dy: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !dx.is_finite() || !dy.is_finite() {
        return None;
    }
    Some((job, dx, dy))
}
