//! Pure rendering: widget state → text.
//!
//! No I/O. Every function returns the exact string the effects layer
//! writes; escape sequences for cursor control come from
//! [`crate::redraw`], colors from [`crate::theme`].

use crate::theme::{answer, dark_gray, green, light_cyan};

use super::state::{MultiSelect, SingleSelect, TokenBuffer};

/// Pointer on the cursor row.
pub const POINTER: &str = "❯";
/// Marker of a highlighted or selected row.
pub const FILLED: &str = "◉";
/// Marker of every other row.
pub const EMPTY: &str = "◯";
/// Shown in place of a hidden answer, whatever its length.
pub const HIDDEN_MASK: &str = "******";

// ============================================================================
// SELECTION BODIES
// ============================================================================

fn row(is_cursor: bool, is_filled: bool, label: &str) -> String {
    let pointer = if is_cursor { green(POINTER) } else { " ".to_string() };
    if is_filled {
        format!("{pointer} {}  {}", light_cyan(FILLED), light_cyan(label))
    } else {
        format!("{pointer} {EMPTY}  {label}")
    }
}

/// Rows of a single-choice menu; the cursor row is the highlighted one.
pub fn single_select_body(state: &SingleSelect, labels: &[String]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| row(i == state.cursor, i == state.cursor, label))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rows of a multi-choice menu; pointer follows the cursor, markers
/// follow the selection.
pub fn multi_select_body(state: &MultiSelect, labels: &[String]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| row(i == state.cursor, state.selected.contains(&i), label))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// PROMPT LINES
// ============================================================================

/// `message (default) ` — the annotation only when a default is given.
pub fn prompt_line(message: &str, default: Option<&str>) -> String {
    match default {
        Some(value) if !value.is_empty() => {
            format!("{message} {} ", dark_gray(&format!("({value})")))
        }
        _ => format!("{message} "),
    }
}

/// `message (Y/n) ` or `message (y/N) `.
pub fn confirm_line(message: &str, default: bool) -> String {
    let hint = if default { "(Y/n)" } else { "(y/N)" };
    format!("{message} {} ", dark_gray(hint))
}

/// Final one-line record of an answered widget.
pub fn summary(message: &str, value: &str) -> String {
    format!("{message} {}", answer(value))
}

/// `[a, b, c]`
pub fn list_answer(values: &[String]) -> String {
    format!("[{}]", values.join(", "))
}

/// What to echo after a key changed a multi-value buffer whose length
/// was `before` characters.
pub fn token_echo(before: usize, after: &TokenBuffer) -> String {
    let now = after.raw.chars().count();
    if now > before {
        after.raw.chars().skip(before).collect()
    } else {
        "\u{8} \u{8}".repeat(before - now)
    }
}

// ============================================================================
// TESTS
// ============================================================================
