//! Error type shared by every interactive widget.

use std::fmt;
use std::io;

/// Errors raised by interactive widgets.
///
/// Level-suppressed output and Ctrl+C are not errors: the former is a
/// silent no-op, the latter terminates the process.
#[derive(Debug)]
pub enum Error {
    /// The output sink cannot do cursor control or key-by-key reading.
    NoTerminal,
    /// A selection widget was handed an empty choice list.
    NoChoices,
    /// The input source reached end-of-file before a terminating key.
    InputClosed,
    /// The terminal boundary failed (write error, malformed input bytes).
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTerminal => write!(f, "no terminal attached"),
            Self::NoChoices => write!(f, "no choices to select from"),
            Self::InputClosed => write!(f, "input closed before an answer was given"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
