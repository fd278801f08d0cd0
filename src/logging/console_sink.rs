//! Console sink
//!
//! Best-effort output of WARNING and above to stderr in the simplified format.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use super::event::{LogEvent, Severity};
use super::format::format_simple;

/// Minimum severity written to the console
pub const CONSOLE_THRESHOLD: Severity = Severity::Warning;

/// Writes simplified lines to the process error stream (or an injected writer)
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl ConsoleSink {
    pub fn stderr() -> Self {
        Self::with_writer(io::stderr())
    }

    /// Use a custom writer (tests, embedding in a host UI)
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Write the event if it meets the console threshold
    pub fn write(&self, event: &LogEvent) {
        if event.severity() < CONSOLE_THRESHOLD {
            return;
        }
        let line = format_simple(event);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        // Console output is best-effort
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    pub fn flush(&self) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.flush();
    }
}
