//! Animated progress indicator.
//!
//! `Running(frame, started) → Completed`. A ticker thread advances the
//! frame and re-renders in place; `complete` (or `fail`) renders one final
//! line ending in a newline. A single `done` flag, checked while holding
//! the output lock, guards both paths: whichever flips it first owns the
//! final line and the ticker never writes after it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::redraw::erase_width;
use crate::terminal::OutputSink;
use crate::theme::{dark_gray, light_green, light_red};

/// Output shared between a logger and its progress tickers.
pub type SharedOutput = Arc<Mutex<Box<dyn OutputSink>>>;

/// Glyph of a successful final line.
pub const DONE_GLYPH: &str = "✓";
/// Glyph of a failed final line.
pub const FAILED_GLYPH: &str = "✗";

pub(crate) fn lock(output: &SharedOutput) -> MutexGuard<'_, Box<dyn OutputSink>> {
    output.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Animation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOptions {
    /// Spinner frames; empty disables animation.
    pub frames: Vec<String>,
    /// Time between ticks.
    pub interval: Duration,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        ProgressOptions {
            frames: ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            interval: Duration::from_millis(80),
        }
    }
}

/// Elapsed time with one decimal, e.g. `1.3s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.1}s", elapsed.as_secs_f64())
}

/// Cut `text` so it occupies at most `width` columns.
fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

// ============================================================================
// TASK STATE
// ============================================================================

/// How the final line ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    Failed,
}

#[derive(Debug)]
struct Task {
    message: String,
    frames: Vec<String>,
    frame: usize,
    started: Instant,
    /// Display width of the line currently on screen.
    drawn: usize,
}

impl Task {
    fn frame_line(&self, columns: Option<usize>) -> (String, usize) {
        let time = format!("({})", format_elapsed(self.started.elapsed()));
        let glyph = self.frames.get(self.frame).map(String::as_str);
        let prefix_width = glyph.map_or(0, |g| g.width() + 1);
        let suffix_width = "... ".len() + time.len();

        let message = match columns {
            Some(cols) => truncate_to_width(
                &self.message,
                cols.saturating_sub(prefix_width + suffix_width + 1),
            ),
            None => self.message.clone(),
        };

        let width = prefix_width + message.width() + suffix_width;
        let line = match glyph {
            Some(g) => format!("{} {message}... {}", light_green(g), dark_gray(&time)),
            None => format!("{message}... {}", dark_gray(&time)),
        };
        (line, width)
    }

    fn final_line(&self, outcome: Outcome) -> String {
        let time = format!("({})", format_elapsed(self.started.elapsed()));
        let glyph = match outcome {
            Outcome::Done => light_green(DONE_GLYPH),
            Outcome::Failed => light_red(FAILED_GLYPH),
        };
        format!("{glyph} {} {}\n", self.message, dark_gray(&time))
    }
}

struct Shared {
    task: Mutex<Task>,
    done: AtomicBool,
    output: SharedOutput,
}

impl Shared {
    fn task(&self) -> MutexGuard<'_, Task> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Draw the current frame over the previous one.
    fn draw(&self, out: &mut Box<dyn OutputSink>, task: &mut Task) {
        let columns = out
            .supports_ansi_escapes()
            .then(|| out.terminal_columns());
        let (line, width) = task.frame_line(columns);
        let erase = erase_width(task.drawn);
        task.drawn = width;
        if let Err(e) = out.write(&format!("{erase}{line}")) {
            tracing::debug!(error = %e, "progress frame write failed");
        }
    }

    /// One ticker step. No output once done.
    fn tick(&self) {
        let mut out = lock(&self.output);
        if self.done.load(Ordering::SeqCst) {
            return;
        }
        let mut task = self.task();
        if !task.frames.is_empty() {
            task.frame = (task.frame + 1) % task.frames.len();
        }
        self.draw(&mut out, &mut task);
    }

    /// Write the final line. Caller must have won the `done` flag.
    fn finish(&self, outcome: Outcome) {
        let mut out = lock(&self.output);
        let mut task = self.task();
        let erase = erase_width(task.drawn);
        task.drawn = 0;
        if let Err(e) = out.write(&format!("{erase}{}", task.final_line(outcome))) {
            tracing::debug!(error = %e, "progress final write failed");
        }
    }
}

// ============================================================================
// HANDLE
// ============================================================================

/// Handle of a running progress indicator.
pub struct Progress {
    shared: Arc<Shared>,
    stop: Option<mpsc::Sender<()>>,
    ticker: Option<thread::JoinHandle<()>>,
}

impl Progress {
    /// Draw the first frame and start ticking.
    ///
    /// Without a terminal nothing is drawn until the final line.
    pub fn start(
        message: impl Into<String>,
        options: &ProgressOptions,
        output: SharedOutput,
    ) -> Self {
        let animated = lock(&output).has_terminal();
        let shared = Arc::new(Shared {
            task: Mutex::new(Task {
                message: message.into(),
                frames: options.frames.clone(),
                frame: 0,
                started: Instant::now(),
                drawn: 0,
            }),
            done: AtomicBool::new(false),
            output,
        });

        if !animated {
            return Progress { shared, stop: None, ticker: None };
        }

        {
            let mut out = lock(&shared.output);
            let mut task = shared.task();
            shared.draw(&mut out, &mut task);
        }

        let (stop, stopped) = mpsc::channel::<()>();
        let interval = options.interval;
        let ticking = Arc::clone(&shared);
        let ticker = thread::spawn(move || {
            loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => ticking.tick(),
                    // Stop signal or handle dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Progress {
            shared,
            stop: Some(stop),
            ticker: Some(ticker),
        }
    }

    /// Whether `complete` or `fail` already ran.
    pub fn is_done(&self) -> bool {
        self.shared.done.load(Ordering::SeqCst)
    }

    /// Change the message shown by subsequent frames.
    pub fn update(&self, message: impl Into<String>) {
        if self.is_done() {
            return;
        }
        self.shared.task().message = message.into();
    }

    /// Finish with the done glyph. Only the first call has any effect.
    pub fn complete(&mut self) {
        self.end(None, Outcome::Done);
    }

    /// Finish with the done glyph and a replacement message.
    pub fn complete_with(&mut self, message: impl Into<String>) {
        self.end(Some(message.into()), Outcome::Done);
    }

    /// Finish with the failure glyph and a replacement message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.end(Some(message.into()), Outcome::Failed);
    }

    fn end(&mut self, message: Option<String>, outcome: Outcome) {
        if self.shared.done.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop_ticker();
        if let Some(message) = message {
            self.shared.task().message = message;
        }
        self.shared.finish(outcome);
    }

    fn stop_ticker(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.join();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.is_done() {
            tracing::debug!("progress dropped before completion");
        }
        self.stop_ticker();
    }
}

// ============================================================================
// TESTS
// ============================================================================
