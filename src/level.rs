//! Severity levels and the leveled output filter.
//!
//! Pure decisions only: given the configured level and the category of a
//! message, should the message be written? No I/O happens here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// LEVEL
// ============================================================================

/// Logger verbosity, ordered from most to least verbose.
///
/// A message is emitted when its level is at or above the configured
/// level. `Quiet` sits above every message level, so it suppresses all
/// output including errors and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Verbose,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
    Quiet,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 7] = [
        Level::Debug,
        Level::Verbose,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Quiet,
    ];

    /// Whether a logger configured at `self` emits a message at `message`.
    pub fn allows(self, message: Level) -> bool {
        self != Level::Quiet && self <= message
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Verbose => "verbose",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
            Level::Quiet => "quiet",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown level name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown level: {}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == lowered)
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

/// Message category of the leveled writers (`info`, `warn`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Detail,
    Info,
    Success,
    Warn,
    Err,
    Alert,
}

impl Category {
    /// The level a message of this category is emitted at.
    pub fn level(self) -> Level {
        match self {
            Category::Detail => Level::Debug,
            Category::Info | Category::Success => Level::Info,
            Category::Warn => Level::Warning,
            Category::Err => Level::Error,
            Category::Alert => Level::Critical,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
