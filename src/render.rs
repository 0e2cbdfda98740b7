//! Terminal rendering for cards, the desk, and the status line.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::sync::watch;

use crate::card::{Card, Origin};
use crate::controller::{CardController, RevealFrame, RevealState};
use crate::desk::Desk;
use crate::status::Status;
use crate::surface::{Bounds, BoundsProvider};

/// Inner width of a rendered card, in columns.
pub const CARD_COLUMNS: usize = 32;

/// The typing cursor shown while a card is revealing.
pub const CURSOR: char = '_';

/// The line under the input: status on the left, counter on the right.
pub fn status_line(status: Status, chars: usize) -> String {
    let counter = format!("CHAR: {chars}");
    let status = status.to_string();
    let gap = (CARD_COLUMNS + 2).saturating_sub(status.len() + counter.len()).max(2);
    format!("{status}{}{counter}", " ".repeat(gap))
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(word.drain(..width).collect());
            }
            if word.is_empty() {
                continue;
            }
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        lines.push(line);
    }
    lines
}

/// Draw a card as a box: header, revealed text, footer.
pub fn render_card(card: &Card, frame: &RevealFrame) -> String {
    let inner = CARD_COLUMNS;
    let mut out = String::new();

    let header = format!("JOB #{}", card.id().job_number());
    let stamp = card.created_at();
    let gap = inner.saturating_sub(header.len() + stamp.len() + 2);
    out.push_str(&format!("┌{}┐\n", "─".repeat(inner)));
    out.push_str(&format!("│ {header}{}{stamp} │\n", " ".repeat(gap)));
    out.push_str(&format!("├{}┤\n", "─".repeat(inner)));

    let mut body = frame.visible.clone();
    if frame.cursor_visible() {
        body.push(CURSOR);
    }
    for line in wrap(&body, inner - 2) {
        let pad = (inner - 2).saturating_sub(line.chars().count());
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }

    let footer = match card.origin() {
        Origin::Manual => "",
        Origin::Enhanced => "⚡ ENHANCED",
    };
    let pad = (inner - 2).saturating_sub(footer.chars().count());
    out.push_str(&format!("├{}┤\n", "─".repeat(inner)));
    out.push_str(&format!("│ {}{footer} │\n", " ".repeat(pad)));
    out.push_str(&format!("└{}┘", "─".repeat(inner)));
    out
}

/// Type a card's text out on stdout as its reveal progresses, then draw
/// the finished card. Owns its inputs so it can run as its own task.
pub async fn play_reveal(card: Arc<Card>, frames: watch::Receiver<RevealFrame>) -> io::Result<()> {
    write_reveal(&mut io::stdout(), &card, frames).await
}

/// [`play_reveal`] into any writer. Returns early if the reveal is
/// cancelled, drawing the card as far as it got.
pub async fn write_reveal<W: Write>(
    out: &mut W,
    card: &Card,
    mut frames: watch::Receiver<RevealFrame>,
) -> io::Result<()> {
    let mut printed = 0;
    let mut last = frames.borrow().clone();

    // clear whatever prompt is on the line
    write!(out, "\x1b[2K\r  ▌ ")?;
    loop {
        let frame = frames.borrow_and_update().clone();
        let fresh: String = frame.visible.chars().skip(printed).collect();
        printed += fresh.chars().count();
        write!(out, "{}", fresh.replace('\n', " "))?;
        out.flush()?;

        let settled = frame.state == RevealState::Settled;
        last = frame;
        if settled || frames.changed().await.is_err() {
            break;
        }
    }
    writeln!(out)?;
    writeln!(out, "{}", render_card(card, &last))?;
    out.flush()
}

/// A scaled map of the desk: each card is marked by its job number at its
/// position, drawn back to front so the top card wins overlaps.
pub fn render_desk(desk: &Desk, columns: usize, rows: usize) -> String {
    let columns = columns.max(8);
    let rows = rows.max(4);
    let Some(bounds) = desk.surface().bounds() else {
        return "(surface not measured)".to_string();
    };

    let mut grid = vec![vec![' '; columns]; rows];
    for controller in desk.render_order() {
        let (col, row) = to_cell(controller, bounds, columns, rows);
        let label = format!("#{}", controller.card().id().job_number());
        for (i, ch) in label.chars().enumerate() {
            if let Some(cell) = grid[row].get_mut(col + i) {
                *cell = ch;
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!("┌{}┐\n", "─".repeat(columns)));
    for row in grid {
        out.push('│');
        out.extend(row);
        out.push_str("│\n");
    }
    out.push_str(&format!("└{}┘", "─".repeat(columns)));
    out
}

/// Map a card's anchor (top center) to a grid cell.
fn to_cell(
    controller: &CardController,
    bounds: Bounds,
    columns: usize,
    rows: usize,
) -> (usize, usize) {
    let p = controller.position();
    let x = if bounds.width > 0.0 {
        (p.offset_x + bounds.width / 2.0) / bounds.width
    } else {
        0.5
    };
    let y = if bounds.height > 0.0 {
        p.offset_y / bounds.height
    } else {
        0.0
    };
    let col = (x.clamp(0.0, 1.0) * (columns - 1) as f64).round() as usize;
    let row = (y.clamp(0.0, 1.0) * (rows - 1) as f64).round() as usize;
    // keep the label on the grid
    (col.min(columns.saturating_sub(5)), row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Placement;
    use std::time::Duration;

    use crate::controller::{Reveal, RevealState, RevealTask};
    use crate::status::StatusLight;

    #[test]
    fn status_line_shows_both_parts() {
        let line = status_line(Status::Uplinking, 12);
        assert!(line.starts_with("UPLINKING..."));
        assert!(line.ends_with("CHAR: 12"));
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("meet at dock 7", 7), ["meet at", "dock 7"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_paragraphs() {
        assert_eq!(wrap("a\nb", 10), ["a", "b"]);
    }

    #[test]
    fn wrap_empty_is_one_blank_line() {
        assert_eq!(wrap("", 10), [""]);
    }

    #[test]
    fn card_shows_cursor_while_revealing() {
        let card = Card::new("hello", Origin::Manual, Placement::DEFAULT);
        let mut reveal = Reveal::new(card.text());
        reveal.tick();
        reveal.tick();
        let out = render_card(&card, &reveal.frame());
        assert!(out.contains("he_"));
        assert!(out.contains(&card.id().job_number()));
        assert!(!out.contains("ENHANCED"));
    }

    #[test]
    fn settled_card_has_no_cursor() {
        let card = Card::new("hello", Origin::Enhanced, Placement::DEFAULT);
        let frame = RevealFrame {
            visible: "hello".to_string(),
            state: RevealState::Settled,
        };
        let out = render_card(&card, &frame);
        assert!(out.contains("hello "));
        assert!(!out.contains("hello_"));
        assert!(out.contains("ENHANCED"));
    }

    #[test]
    fn card_lines_have_equal_width() {
        let card = Card::new(
            "a rather long message that will need to wrap across lines",
            Origin::Enhanced,
            Placement::DEFAULT,
        );
        let frame = RevealFrame {
            visible: card.text().to_string(),
            state: RevealState::Settled,
        };
        let out = render_card(&card, &frame);
        let widths: Vec<usize> = out.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == CARD_COLUMNS + 2), "{widths:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_is_typed_then_boxed() {
        let card = Card::new("beep", Origin::Manual, Placement::DEFAULT);
        let light = StatusLight::new();
        let task = RevealTask::start(card.text(), Duration::from_millis(40), &light);

        let mut out = Vec::new();
        write_reveal(&mut out, &card, task.subscribe()).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("▌ beep\n"), "{out:?}");
        assert!(out.contains(&format!("JOB #{}", card.id().job_number())));
        assert!(!out.contains("beep_"));
        assert!(!light.any_revealing());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reveal_draws_what_was_typed() {
        let card = Card::new("a longer line", Origin::Manual, Placement::DEFAULT);
        let light = StatusLight::new();
        let task = RevealTask::start(card.text(), Duration::from_millis(40), &light);
        let frames = task.subscribe();

        tokio::time::sleep(Duration::from_millis(90)).await;
        drop(task);

        let mut out = Vec::new();
        write_reveal(&mut out, &card, frames).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("▌ a \n"), "{out:?}");
        assert!(out.contains("a _"));
    }
}
