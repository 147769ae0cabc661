//! The logger: leveled output plus the interactive widgets.
//!
//! This is the effects boundary. It owns the terminal collaborators, reads
//! keys, and writes what the pure layers (`widget::state`,
//! `widget::update`, `widget::view`, `redraw`) compute. One widget runs at
//! a time; each call holds `&mut self` for its whole read-render loop.

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::key::{Key, KeyDecoder};
use crate::level::{Category, Level};
use crate::progress::{Progress, ProgressOptions, SharedOutput, lock};
use crate::redraw::{Region, overwrite_answered};
use crate::terminal::{
    InputSource, OutputSink, ProcessControl, RawMode, SystemProcess, TerminalInput,
    TerminalOutput,
};
use crate::theme::{StyleFn, Theme, answer};
use crate::widget::state::{
    LineBuffer, MultiSelect, SingleSelect, TokenBuffer, Transition, index_of, indices_of,
};
use crate::widget::update::{
    resolve_confirmation, update_line, update_multi, update_single, update_tokens,
};
use crate::widget::view::{
    HIDDEN_MASK, confirm_line, list_answer, multi_select_body, prompt_line, single_select_body,
    summary, token_echo,
};

/// Exit status used when the user presses Ctrl+C.
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// Default separator of [`Logger::prompt_any`].
pub const DEFAULT_SEPARATOR: char = ',';

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Logger settings.
///
/// ```
/// use herald::{Level, LoggerConfig};
///
/// let config = LoggerConfig { level: Level::Debug, ..Default::default() };
/// assert_eq!(config.level, Level::Debug);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoggerConfig {
    pub level: Level,
    pub theme: Theme,
    pub progress: ProgressOptions,
}

/// Options of [`Logger::prompt`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOptions {
    /// Returned when the user submits an empty answer.
    pub default_value: Option<String>,
    /// Read without echo and show a fixed mask in the summary.
    pub hidden: bool,
}

/// Choices of a selection widget and their display labels.
///
/// Labels are projected once, up front. Defaults are matched against the
/// values with `PartialEq`, never against the labels.
pub struct Choices<T> {
    items: Vec<T>,
    labels: Vec<String>,
}

impl<T: fmt::Display> Choices<T> {
    /// Choices displayed with their `Display` impl.
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self::with_display(items, T::to_string)
    }
}

impl<T> Choices<T> {
    /// Choices displayed through `display`.
    pub fn with_display(
        items: impl IntoIterator<Item = T>,
        display: impl Fn(&T) -> String,
    ) -> Self {
        let items: Vec<T> = items.into_iter().collect();
        let labels = items.iter().map(display).collect();
        Choices { items, labels }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl<T: fmt::Debug> fmt::Debug for Choices<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choices")
            .field("items", &self.items)
            .field("labels", &self.labels)
            .finish()
    }
}

// ============================================================================
// LOGGER
// ============================================================================

/// Leveled output and interactive prompts over one terminal.
pub struct Logger {
    level: Level,
    theme: Theme,
    progress: ProgressOptions,
    queue: Vec<String>,
    output: SharedOutput,
    input: Box<dyn InputSource>,
    process: Box<dyn ProcessControl>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("theme", &self.theme)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger on the process's stdin/stdout at `Level::Info`.
    pub fn new() -> Self {
        Self::with_config(LoggerConfig::default())
    }

    /// Logger on the process's stdin/stdout.
    pub fn with_config(config: LoggerConfig) -> Self {
        Self::with_io(config, TerminalOutput, TerminalInput, SystemProcess)
    }

    /// Logger on explicit terminal collaborators.
    pub fn with_io(
        config: LoggerConfig,
        output: impl OutputSink + 'static,
        input: impl InputSource + 'static,
        process: impl ProcessControl + 'static,
    ) -> Self {
        Logger {
            level: config.level,
            theme: config.theme,
            progress: config.progress,
            queue: Vec::new(),
            output: Arc::new(Mutex::new(Box::new(output))),
            input: Box::new(input),
            process: Box::new(process),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    // ------------------------------------------------------------------------
    // Output helpers
    // ------------------------------------------------------------------------

    fn emit(&self, text: &str) -> io::Result<()> {
        lock(&self.output).write(text)
    }

    fn emitln(&self, text: &str) -> io::Result<()> {
        lock(&self.output).writeln(text)
    }

    /// Write during a raw-mode session.
    fn emit_raw(&self, raw: &RawMode, text: &str) -> io::Result<()> {
        self.emit(&raw.translate(text))
    }

    fn has_terminal(&self) -> bool {
        lock(&self.output).has_terminal()
    }

    fn supports_ansi(&self) -> bool {
        lock(&self.output).supports_ansi_escapes()
    }

    /// Log-style line: failures are reported, never returned.
    fn log_line(&self, text: &str) {
        if let Err(e) = self.emitln(text) {
            tracing::warn!(error = %e, "failed to write log line");
        }
    }

    /// Prefix that replaces an answered prompt line, if escapes work.
    fn overwrite_prefix(&self, line: &str) -> String {
        if self.supports_ansi() {
            overwrite_answered(line)
        } else {
            String::new()
        }
    }

    /// Fail with `NoTerminal` after writing `pending` if no terminal is
    /// attached.
    fn require_terminal(&self, pending: &str) -> Result<()> {
        if self.has_terminal() {
            return Ok(());
        }
        self.emitln(pending)?;
        tracing::debug!("interactive widget requested without a terminal");
        Err(Error::NoTerminal)
    }

    // ------------------------------------------------------------------------
    // Leveled output
    // ------------------------------------------------------------------------

    /// Write `message` if `category` passes the level filter.
    ///
    /// `style` overrides both the theme entry and the built-in style.
    pub fn log(&self, category: Category, message: &str, style: Option<&StyleFn>) {
        if !self.level.allows(category.level()) {
            return;
        }
        self.log_line(&self.theme.apply(category, message, style));
    }

    pub fn detail(&self, message: &str) {
        self.log(Category::Detail, message, None);
    }

    pub fn info(&self, message: &str) {
        self.log(Category::Info, message, None);
    }

    pub fn success(&self, message: &str) {
        self.log(Category::Success, message, None);
    }

    /// Warning prefixed with `[WARN]`.
    pub fn warn(&self, message: &str) {
        self.warn_tagged(message, "WARN");
    }

    /// Warning prefixed with `[tag]`; an empty tag adds no prefix.
    pub fn warn_tagged(&self, message: &str, tag: &str) {
        if tag.is_empty() {
            self.log(Category::Warn, message, None);
        } else {
            self.log(Category::Warn, &format!("[{tag}] {message}"), None);
        }
    }

    pub fn err(&self, message: &str) {
        self.log(Category::Err, message, None);
    }

    pub fn alert(&self, message: &str) {
        self.log(Category::Alert, message, None);
    }

    /// Write `text` as-is: no level filter, no newline.
    pub fn write(&self, text: &str) {
        if let Err(e) = self.emit(text) {
            tracing::warn!(error = %e, "failed to write output");
        }
    }

    /// Queue an info-level line for the next [`flush`](Self::flush).
    ///
    /// The level filter applies now, not at flush time.
    pub fn delayed(&mut self, message: impl Into<String>) {
        if self.level.allows(Level::Info) {
            self.queue.push(message.into());
        }
    }

    /// Write every queued line in order and empty the queue.
    pub fn flush(&mut self) {
        for line in std::mem::take(&mut self.queue) {
            self.log_line(&line);
        }
    }

    /// Hand every queued line to `print` in order and empty the queue.
    pub fn flush_with(&mut self, mut print: impl FnMut(&str)) {
        for line in std::mem::take(&mut self.queue) {
            print(&line);
        }
    }

    // ------------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------------

    /// Next key, with Ctrl+C handled here: it ends the process.
    fn next_key(&mut self) -> Result<Key> {
        let key = KeyDecoder::new(self.input.as_mut()).next_key()?;
        match key {
            Some(Key::CtrlC) => self.interrupt(),
            Some(key) => Ok(key),
            None => Err(Error::InputClosed),
        }
    }

    fn interrupt(&self) -> ! {
        tracing::debug!("interrupted by Ctrl+C");
        if self.supports_ansi() {
            // The terminal may still be raw, so no bare line feed.
            let _ = self.emit("\x1b[?25h\r\n");
        }
        self.process.exit(INTERRUPT_EXIT_CODE)
    }

    // ------------------------------------------------------------------------
    // Line prompts
    // ------------------------------------------------------------------------

    /// Ask for one line of text.
    ///
    /// An empty answer returns the default (or an empty string). Hidden
    /// prompts read key by key without echo and show a fixed mask in the
    /// summary; the literal answer is returned.
    pub fn prompt(&mut self, message: &str, options: PromptOptions) -> Result<String> {
        let default = options.default_value.unwrap_or_default();
        let line = prompt_line(message, Some(default.as_str()));
        self.emit(&line)?;

        let typed = if options.hidden {
            self.read_hidden()?
        } else {
            self.input
                .read_line()?
                .map(|l| l.trim().to_string())
                .unwrap_or_default()
        };
        let response = if typed.is_empty() { default } else { typed };

        let shown = if options.hidden { HIDDEN_MASK } else { response.as_str() };
        let prefix = self.overwrite_prefix(&line);
        self.emitln(&format!("{prefix}{line}{}", answer(shown)))?;
        Ok(response)
    }

    /// Read keys until Enter. End of input ends the line early.
    fn read_hidden(&mut self) -> Result<String> {
        let raw = self.input.raw_mode()?;
        let mut buffer = LineBuffer::default();
        let value = loop {
            let key = match self.next_key() {
                Ok(key) => key,
                Err(Error::InputClosed) => break buffer.as_string(),
                Err(e) => return Err(e),
            };
            match update_line(buffer, key) {
                Transition::Continue(next) => buffer = next,
                Transition::Done(value) => break value,
            }
        };
        // Enter was not echoed.
        self.emit_raw(&raw, "\n")?;
        Ok(value)
    }

    /// Ask a yes/no question.
    ///
    /// Unrecognised answers, end of input and unreadable input all resolve
    /// to `default`.
    pub fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let line = confirm_line(message, default);
        self.emit(&line)?;

        let read = self.input.read_line();
        if let Err(e) = &read {
            tracing::debug!(error = %e, "unreadable confirmation, using default");
        }
        let accepted = resolve_confirmation(&read, default);

        let prefix = self.overwrite_prefix(&line);
        let shown = if accepted { "Yes" } else { "No" };
        self.emitln(&format!("{prefix}{line}{}", answer(shown)))?;
        Ok(accepted)
    }

    /// Ask for several values typed on one line, split on `,`.
    pub fn prompt_any(&mut self, message: &str) -> Result<Vec<String>> {
        self.prompt_any_with(message, DEFAULT_SEPARATOR)
    }

    /// Ask for several values typed on one line, split on `separator`.
    pub fn prompt_any_with(&mut self, message: &str, separator: char) -> Result<Vec<String>> {
        let line = format!("{message} ");
        self.require_terminal(&line)?;
        self.emit(&line)?;

        let raw = self.input.raw_mode()?;
        let mut buffer = TokenBuffer::new(separator);
        let tokens = loop {
            let key = self.next_key()?;
            let before = buffer.raw.chars().count();
            match update_tokens(buffer, key) {
                Transition::Continue(next) => {
                    let echo = token_echo(before, &next);
                    if !echo.is_empty() {
                        self.emit(&echo)?;
                    }
                    buffer = next;
                }
                Transition::Done(tokens) => break tokens,
            }
        };
        self.emit_raw(&raw, "\n")?;
        drop(raw);

        let prefix = self.overwrite_prefix(&line);
        self.emitln(&format!("{prefix}{}", summary(message, &list_answer(&tokens))))?;
        Ok(tokens)
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Pick exactly one choice with the arrow keys (or j/k) and Enter.
    ///
    /// The cursor starts on `default` when it is among the choices; Space
    /// picks `default` right away.
    pub fn choose_one<T: PartialEq>(
        &mut self,
        message: &str,
        choices: Choices<T>,
        default: Option<&T>,
    ) -> Result<T> {
        let Choices { items, labels } = choices;
        let default_index = default.and_then(|d| index_of(&items, d));
        let Some(mut state) = SingleSelect::new(labels.len(), default_index) else {
            return Err(Error::NoChoices);
        };
        self.require_terminal(message)?;

        let raw = self.input.raw_mode()?;
        let region = Region::new(message);
        self.emit_raw(&raw, &region.render(&single_select_body(&state, &labels)))?;
        let index = loop {
            let key = self.next_key()?;
            match update_single(state, key) {
                Transition::Continue(next) => {
                    state = next;
                    self.emit_raw(&raw, &region.redraw(&single_select_body(&state, &labels)))?;
                }
                Transition::Done(index) => break index,
            }
        };

        let label = labels.get(index).map_or("", String::as_str);
        self.emit_raw(&raw, &region.commit(&summary(message, label)))?;
        items.into_iter().nth(index).ok_or(Error::NoChoices)
    }

    /// Pick any number of choices: Space toggles, Enter confirms.
    ///
    /// Choices equal to one of `defaults` start selected. The result keeps
    /// the order of `choices`.
    pub fn choose_any<T: PartialEq>(
        &mut self,
        message: &str,
        choices: Choices<T>,
        defaults: &[T],
    ) -> Result<Vec<T>> {
        let Choices { items, labels } = choices;
        let selected = indices_of(&items, defaults);
        let Some(mut state) = MultiSelect::new(labels.len(), selected) else {
            return Err(Error::NoChoices);
        };
        self.require_terminal(message)?;

        let raw = self.input.raw_mode()?;
        let region = Region::new(message);
        self.emit_raw(&raw, &region.render(&multi_select_body(&state, &labels)))?;
        let indices = loop {
            let key = self.next_key()?;
            match update_multi(state, key) {
                Transition::Continue(next) => {
                    state = next;
                    self.emit_raw(&raw, &region.redraw(&multi_select_body(&state, &labels)))?;
                }
                Transition::Done(indices) => break indices,
            }
        };

        let picked_labels: Vec<String> = indices
            .iter()
            .filter_map(|&i| labels.get(i).cloned())
            .collect();
        let committed = summary(message, &list_answer(&picked_labels));
        self.emit_raw(&raw, &region.commit(&committed))?;
        Ok(items
            .into_iter()
            .enumerate()
            .filter(|(i, _)| indices.contains(i))
            .map(|(_, item)| item)
            .collect())
    }

    // ------------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------------

    /// Start an animated progress line; finish it with
    /// [`Progress::complete`].
    pub fn progress(&self, message: &str) -> Progress {
        Progress::start(message, &self.progress, Arc::clone(&self.output))
    }
}

// ============================================================================
// TESTS
// ============================================================================
