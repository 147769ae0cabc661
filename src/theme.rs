//! Style functions and the log theme.
//!
//! A style is any `Fn(&str) -> String` that wraps text in escape codes.
//! The built-in styles are produced with crossterm's `Stylize`, which also
//! honours `NO_COLOR`.
//!
//! Color semantics:
//! - Light cyan: answers and highlighted choices
//! - Green: cursor pointer, spinner frames, success
//! - Yellow: warnings
//! - Red: errors, alerts, failed progress
//! - Dark grey: annotations (defaults, elapsed time, detail)

use std::fmt;
use std::sync::Arc;

use crossterm::style::{Color, Stylize, style};

use crate::level::Category;

/// A pure text wrapper, safe to nest.
pub type StyleFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

// ============================================================================
// BUILT-IN STYLES
// ============================================================================

fn fg(text: &str, color: Color) -> String {
    style(text).with(color).to_string()
}

pub fn light_cyan(text: &str) -> String {
    fg(text, Color::Cyan)
}

pub fn green(text: &str) -> String {
    fg(text, Color::DarkGreen)
}

pub fn light_green(text: &str) -> String {
    fg(text, Color::Green)
}

pub fn light_red(text: &str) -> String {
    fg(text, Color::Red)
}

pub fn dark_gray(text: &str) -> String {
    fg(text, Color::DarkGrey)
}

pub fn warning(text: &str) -> String {
    style(text).with(Color::Yellow).bold().to_string()
}

pub fn alert(text: &str) -> String {
    style(text).with(Color::White).on(Color::Red).bold().to_string()
}

pub fn dim(text: &str) -> String {
    style(text).dim().to_string()
}

/// Style of a committed answer in a summary line.
pub fn answer(text: &str) -> String {
    dim(&light_cyan(text))
}

// ============================================================================
// THEME
// ============================================================================

/// Per-category style overrides for the leveled writers.
///
/// Missing entries fall back to the built-in style of the category.
#[derive(Clone, Default)]
pub struct Theme {
    pub info: Option<StyleFn>,
    pub warn: Option<StyleFn>,
    pub err: Option<StyleFn>,
    pub alert: Option<StyleFn>,
    pub detail: Option<StyleFn>,
    pub success: Option<StyleFn>,
}

impl Theme {
    fn entry(&self, category: Category) -> Option<&StyleFn> {
        match category {
            Category::Info => self.info.as_ref(),
            Category::Warn => self.warn.as_ref(),
            Category::Err => self.err.as_ref(),
            Category::Alert => self.alert.as_ref(),
            Category::Detail => self.detail.as_ref(),
            Category::Success => self.success.as_ref(),
        }
    }

    /// Style `text` for `category`.
    ///
    /// Precedence: `override_style`, then the theme entry, then the
    /// built-in default.
    pub fn apply(
        &self,
        category: Category,
        text: &str,
        override_style: Option<&StyleFn>,
    ) -> String {
        if let Some(f) = override_style.or_else(|| self.entry(category)) {
            return f(text);
        }
        match category {
            Category::Info => text.to_string(),
            Category::Detail => dark_gray(text),
            Category::Success => light_green(text),
            Category::Warn => warning(text),
            Category::Err => light_red(text),
            Category::Alert => alert(text),
        }
    }
}

impl fmt::Debug for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Theme")
            .field("info", &self.info.is_some())
            .field("warn", &self.warn.is_some())
            .field("err", &self.err.is_some())
            .field("alert", &self.alert.is_some())
            .field("detail", &self.detail.is_some())
            .field("success", &self.success.is_some())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
