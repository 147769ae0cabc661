//! Terminal boundary: output sink, input source, process control.
//!
//! This is the only module that touches the real terminal. Everything
//! else programs against the three traits, so widgets can be driven by the
//! in-memory implementations in tests and headless hosts.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::{self, BufRead, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crossterm::terminal;
use crossterm::tty::IsTty;

/// Fallback width when the terminal size cannot be queried.
pub const DEFAULT_COLUMNS: usize = 80;

// ============================================================================
// TRAITS
// ============================================================================

/// Where rendered text goes.
pub trait OutputSink: Send {
    /// Write `text` as-is (no trailing newline) and flush.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Write `text` followed by a newline.
    fn writeln(&mut self, text: &str) -> io::Result<()> {
        self.write(&format!("{text}\n"))
    }

    /// Whether a terminal is attached (cursor control is possible).
    fn has_terminal(&self) -> bool;

    /// Whether ANSI escape sequences are understood.
    fn supports_ansi_escapes(&self) -> bool;

    /// Width of the terminal in columns.
    fn terminal_columns(&self) -> usize;
}

/// Where keystrokes and lines come from.
pub trait InputSource: Send {
    /// Read one line without its terminator. `Ok(None)` at end of input.
    ///
    /// Fails with `InvalidData` if the bytes are not valid UTF-8.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Read a single byte. `Ok(None)` at end of input.
    ///
    /// Echo and line buffering are only off while a [`RawMode`] session
    /// from [`raw_mode`](Self::raw_mode) is alive.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Start a raw-mode session for a key-by-key widget.
    fn raw_mode(&mut self) -> io::Result<RawMode> {
        Ok(RawMode::inactive())
    }
}

/// Process termination, invoked with 130 on Ctrl+C.
pub trait ProcessControl: Send {
    fn exit(&self, code: i32) -> !;
}

// ============================================================================
// RAW MODE
// ============================================================================

/// Raw-mode session held across one widget's read-render loop.
///
/// The terminal goes back to cooked mode when the session is dropped.
/// While it is active the terminal does no output processing, so line
/// breaks must be written as `\r\n`; [`translate`](Self::translate) does
/// that.
#[derive(Debug)]
pub struct RawMode {
    active: bool,
    owns_terminal: bool,
}

impl RawMode {
    /// Put the process's terminal into raw mode.
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode { active: true, owns_terminal: true })
    }

    /// A session that changes nothing (input is not a terminal).
    pub fn inactive() -> Self {
        RawMode { active: false, owns_terminal: false }
    }

    /// Raw-mode output rules without touching a real terminal.
    fn simulated() -> Self {
        RawMode { active: true, owns_terminal: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `text` with every `\n` turned into `\r\n` while raw mode is on.
    pub fn translate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.active && text.contains('\n') {
            Cow::Owned(text.replace('\n', "\r\n"))
        } else {
            Cow::Borrowed(text)
        }
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if !self.owns_terminal {
            return;
        }
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!(error = %e, "failed to leave raw mode");
        }
    }
}

// ============================================================================
// REAL TERMINAL
// ============================================================================

/// Standard output of the current process.
#[derive(Debug, Default)]
pub struct TerminalOutput;

impl OutputSink for TerminalOutput {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn has_terminal(&self) -> bool {
        io::stdout().is_tty()
    }

    fn supports_ansi_escapes(&self) -> bool {
        self.has_terminal() && std::env::var("TERM").map_or(true, |term| term != "dumb")
    }

    fn terminal_columns(&self) -> usize {
        terminal::size().map_or(DEFAULT_COLUMNS, |(cols, _)| usize::from(cols))
    }
}

/// Standard input of the current process.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn raw_mode(&mut self) -> io::Result<RawMode> {
        if io::stdin().is_tty() {
            RawMode::enable()
        } else {
            Ok(RawMode::inactive())
        }
    }
}

/// Exits the current process.
#[derive(Debug, Default)]
pub struct SystemProcess;

impl ProcessControl for SystemProcess {
    /// Leaves raw mode first: exiting skips the active session's drop.
    fn exit(&self, code: i32) -> ! {
        let _ = terminal::disable_raw_mode();
        std::process::exit(code)
    }
}

// ============================================================================
// IN-MEMORY TERMINAL
// ============================================================================

/// Output sink that captures everything written to it.
///
/// Clones share the same buffer, so a test can keep one clone and hand
/// the other to a logger.
#[derive(Debug, Clone)]
pub struct MemoryOutput {
    buffer: Arc<Mutex<String>>,
    terminal: bool,
    ansi: bool,
    columns: usize,
}

impl MemoryOutput {
    /// A capturing sink that behaves like an ANSI terminal.
    pub fn terminal() -> Self {
        MemoryOutput {
            buffer: Arc::default(),
            terminal: true,
            ansi: true,
            columns: DEFAULT_COLUMNS,
        }
    }

    /// A capturing sink that behaves like a pipe or file.
    pub fn piped() -> Self {
        MemoryOutput {
            buffer: Arc::default(),
            terminal: false,
            ansi: false,
            columns: DEFAULT_COLUMNS,
        }
    }

    /// Override the reported terminal width.
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain and return everything written so far.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl OutputSink for MemoryOutput {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
        Ok(())
    }

    fn has_terminal(&self) -> bool {
        self.terminal
    }

    fn supports_ansi_escapes(&self) -> bool {
        self.ansi
    }

    fn terminal_columns(&self) -> usize {
        self.columns
    }
}

/// Input source fed from queued bytes and lines.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    bytes: VecDeque<u8>,
    lines: VecDeque<io::Result<String>>,
    raw: bool,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue raw bytes for `read_byte`.
    pub fn bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.bytes.extend(bytes.as_ref());
        self
    }

    /// Queue a line for `read_line`.
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push_back(Ok(line.into()));
        self
    }

    /// Hand out active raw-mode sessions, as a real terminal would.
    pub fn raw_terminal(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Queue a `read_line` failure of the kind malformed UTF-8 produces.
    pub fn malformed_line(mut self) -> Self {
        self.lines.push_back(Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        )));
        self
    }
}

impl InputSource for ScriptedInput {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.pop_front().transpose()
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.bytes.pop_front())
    }

    fn raw_mode(&mut self) -> io::Result<RawMode> {
        if self.raw {
            Ok(RawMode::simulated())
        } else {
            Ok(RawMode::inactive())
        }
    }
}

/// Process control that panics with `exit(<code>)` instead of exiting.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct PanicExit;

#[cfg(test)]
impl ProcessControl for PanicExit {
    fn exit(&self, code: i32) -> ! {
        panic!("exit({code})")
    }
}

/// Replay `output` on a blank screen and return its lines.
///
/// Understands what widgets write: save/restore, cursor up, clear line,
/// clear to end of screen, backspace. Styling and cursor visibility are
/// skipped. `\n` moves to the start of the next line, as a cooked
/// terminal does. Trailing blanks are trimmed.
#[cfg(test)]
pub(crate) fn screen_lines(output: &str) -> Vec<String> {
    let mut rows: Vec<Vec<char>> = vec![Vec::new()];
    let (mut row, mut col) = (0usize, 0usize);
    let mut saved = (0usize, 0usize);
    let mut chars = output.chars();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.next() {
                Some('7') => saved = (row, col),
                Some('8') => (row, col) = saved,
                Some('[') => {
                    let mut params = String::new();
                    let mut command = None;
                    for c in chars.by_ref() {
                        if c.is_ascii_digit() || c == ';' || c == '?' {
                            params.push(c);
                        } else {
                            command = Some(c);
                            break;
                        }
                    }
                    let n = params.parse::<usize>().unwrap_or(1);
                    match command {
                        Some('A') => row = row.saturating_sub(n),
                        Some('K') => rows[row].clear(),
                        Some('J') => {
                            rows[row].truncate(col);
                            rows.truncate(row + 1);
                        }
                        _ => {}
                    }
                }
                _ => {}
            },
            '\n' => {
                row += 1;
                col = 0;
            }
            '\r' => col = 0,
            '\u{8}' => col = col.saturating_sub(1),
            c => {
                let line = &mut rows[row];
                if line.len() <= col {
                    line.resize(col, ' ');
                    line.push(c);
                } else {
                    line[col] = c;
                }
                col += 1;
            }
        }
        while rows.len() <= row {
            rows.push(Vec::new());
        }
    }
    let mut lines: Vec<String> = rows
        .iter()
        .map(|r| r.iter().collect::<String>().trim_end().to_string())
        .collect();
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_output_clones_share_the_buffer() {
        let capture = MemoryOutput::terminal();
        let mut sink = capture.clone();
        sink.write("a").unwrap();
        sink.writeln("b").unwrap();
        assert_eq!(capture.contents(), "ab\n");
        assert_eq!(capture.take(), "ab\n");
        assert_eq!(capture.contents(), "");
    }

    #[test]
    fn piped_output_reports_no_terminal() {
        let sink = MemoryOutput::piped();
        assert!(!sink.has_terminal());
        assert!(!sink.supports_ansi_escapes());
    }

    #[test]
    fn scripted_input_yields_queued_items_then_eof() {
        let mut input = ScriptedInput::new().bytes("ab").line("yes");
        assert_eq!(input.read_byte().unwrap(), Some(b'a'));
        assert_eq!(input.read_byte().unwrap(), Some(b'b'));
        assert_eq!(input.read_byte().unwrap(), None);
        assert_eq!(input.read_line().unwrap().as_deref(), Some("yes"));
        assert_eq!(input.read_line().unwrap(), None);
    }

    #[test]
    fn raw_session_translates_line_breaks_only_while_active() {
        let raw = ScriptedInput::new().raw_terminal().raw_mode().unwrap();
        assert!(raw.is_active());
        assert_eq!(raw.translate("a\nb\n"), "a\r\nb\r\n");

        let cooked = ScriptedInput::new().raw_mode().unwrap();
        assert!(!cooked.is_active());
        assert_eq!(cooked.translate("a\nb\n"), "a\nb\n");
    }

    #[test]
    fn screen_replays_save_restore_and_clears() {
        let lines = screen_lines("top\n\x1b7old\nrows\x1b8\x1b[Jnew\n");
        assert_eq!(lines, vec!["top", "new"]);
        assert_eq!(screen_lines("ab\u{8}c\n\x1b[1A\x1b[2Kz"), vec!["z"]);
    }

    #[test]
    fn malformed_line_surfaces_invalid_data() {
        let mut input = ScriptedInput::new().malformed_line();
        let err = input.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
