//! Redraw controller: the escape-sequence choreography of a widget.
//!
//! Every interactive widget owns a region that starts at the first line of
//! its message. The region is drawn once, redrawn after every key, and
//! finally collapsed into a single summary line:
//!
//! - render:   save cursor, hide cursor, message, body
//! - redraw:   restore cursor, clear line, message, body
//! - commit:   restore cursor, clear to end of screen, summary + newline, show cursor
//!
//! The cursor is saved before the first message line is written, so a
//! restore always lands there, however many lines the message spans.
//!
//! Sequences are produced by crossterm commands rendered to strings, so
//! they match what crossterm itself would queue.

use crossterm::Command;
use crossterm::cursor::{Hide, MoveUp, RestorePosition, SavePosition, Show};
use crossterm::terminal::{Clear, ClearType};

fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = command.write_ansi(&mut out);
    out
}

fn move_up(lines: usize) -> String {
    if lines == 0 {
        return String::new();
    }
    ansi(MoveUp(u16::try_from(lines).unwrap_or(u16::MAX)))
}

/// Number of line breaks inside `message`.
pub fn newlines(message: &str) -> usize {
    message.matches('\n').count()
}

/// Draws and redraws the region of one interactive widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    message: String,
}

impl Region {
    pub fn new(message: impl Into<String>) -> Self {
        Region { message: message.into() }
    }

    fn contents(&self, body: &str) -> String {
        format!("{}\n{body}", self.message)
    }

    /// First draw: save cursor, hide it, message, then `body`.
    pub fn render(&self, body: &str) -> String {
        let mut out = ansi(SavePosition);
        out.push_str(&ansi(Hide));
        out.push_str(&self.contents(body));
        out
    }

    /// Redraw after a key: back to the first message line, then message
    /// and `body` again. The saved position is kept.
    pub fn redraw(&self, body: &str) -> String {
        let mut out = ansi(RestorePosition);
        out.push_str(&ansi(Clear(ClearType::CurrentLine)));
        out.push_str(&self.contents(body));
        out
    }

    /// Replace the region with `summary` as permanent output.
    pub fn commit(&self, summary: &str) -> String {
        let mut out = ansi(RestorePosition);
        out.push_str(&ansi(Clear(ClearType::FromCursorDown)));
        out.push_str(summary);
        out.push('\n');
        out.push_str(&ansi(Show));
        out
    }
}

/// Prefix that overwrites the line just answered in line mode.
///
/// The terminal echoed the answer and a newline, so the cursor sits one
/// line below the prompt; a multi-line prompt needs `N` more lines up.
pub fn overwrite_answered(message: &str) -> String {
    let mut out = move_up(1);
    out.push_str(&ansi(Clear(ClearType::CurrentLine)));
    out.push_str(&move_up(newlines(message)));
    out
}

/// Escape-free erase of the last `width` columns on the current line.
pub fn erase_width(width: usize) -> String {
    let back = "\u{8}".repeat(width);
    format!("{back}{}{back}", " ".repeat(width))
}

// ============================================================================
// TESTS
// ============================================================================
