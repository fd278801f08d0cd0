//! Text representations of log events
//!
//! Two deterministic formats: a detailed one for log files and a simplified
//! one for the console.

use std::fmt::Write as _;

use super::event::{ErrorInfo, LogEvent};

/// Timestamp layout used in log files (millisecond precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Default number of stack frames printed per exception
pub const DEFAULT_MAX_STACK_FRAMES: usize = 10;

/// Formats the detailed, file-oriented representation of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailedFormatter {
    max_stack_frames: usize,
}

impl Default for DetailedFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STACK_FRAMES)
    }
}

impl DetailedFormatter {
    pub fn new(max_stack_frames: usize) -> Self {
        Self { max_stack_frames }
    }

    /// Format an event, including its exception block, terminated by a newline
    ///
    /// `{timestamp} {level<7} [{thread<15}] {class} - {message}`
    pub fn format(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(96 + event.message().len());
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{} {:<7} [{:<15}] {} - {}",
            event.timestamp().format(TIMESTAMP_FORMAT),
            event.severity(),
            event.thread(),
            event.class(),
            event.message()
        );
        if let Some(error) = event.error() {
            self.write_exception(&mut out, error);
        }
        out
    }

    fn write_exception(&self, out: &mut String, error: &ErrorInfo) {
        for (depth, info) in error.chain().enumerate() {
            let heading = if depth == 0 { "Exception" } else { "Caused by" };
            let _ = writeln!(out, "{}: {}: {}", heading, info.type_name, info.message);

            for frame in info.frames.iter().take(self.max_stack_frames) {
                let _ = writeln!(out, "    at {}", frame);
            }
            let hidden = info.frames.len().saturating_sub(self.max_stack_frames);
            if hidden > 0 {
                let _ = writeln!(out, "    ... {} more lines", hidden);
            }
        }
    }
}

/// Format the simplified, console-oriented representation of an event
///
/// `{level} {class}: {message}`
pub fn format_simple(event: &LogEvent) -> String {
    format!(
        "{} {}: {}\n",
        event.severity(),
        event.class(),
        event.message()
    )
}
