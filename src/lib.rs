//! herald: interactive terminal output for command-line tools.
//!
//! Leveled logging, prompts, selection menus and progress spinners that
//! redraw a region of the terminal in place and leave one clean summary
//! line behind.

pub mod error;
pub mod key;
pub mod level;
pub mod logger;
pub mod progress;
pub mod redraw;
pub mod terminal;
pub mod theme;
pub mod widget;

pub use error::{Error, Result};
pub use level::{Category, Level};
pub use logger::{Choices, Logger, LoggerConfig, PromptOptions};
pub use progress::{Progress, ProgressOptions};
pub use theme::{StyleFn, Theme};
