//! Log events and severities
//!
//! A [`LogEvent`] is built once at the call site and then only read by the sinks.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

use chrono::{DateTime, Local, NaiveDate};

/// Severity of a log event, ordered `Info < Warning < Severe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

impl Severity {
    /// Get the display name for this severity
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Severe => "SEVERE",
        }
    }

    /// Map a `tracing` level; DEBUG and TRACE sit below INFO and have no severity
    pub fn from_tracing(level: tracing::Level) -> Option<Self> {
        match level {
            tracing::Level::ERROR => Some(Severity::Severe),
            tracing::Level::WARN => Some(Severity::Warning),
            tracing::Level::INFO => Some(Severity::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Forward to `pad` so width/alignment specifiers apply
        f.pad(self.as_str())
    }
}

/// An error attached to a log event, with its cause chain and stack frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Type name of the error (e.g. `std::io::Error`)
    pub type_name: String,
    /// Display message of the error
    pub message: String,
    /// Stack frames, outermost first
    pub frames: Vec<String>,
    /// The error that caused this one, if any
    pub cause: Option<Box<ErrorInfo>>,
}

impl ErrorInfo {
    /// Create an error description without frames or cause
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Attach stack frames
    pub fn with_frames<I, S>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frames = frames.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the error that caused this one
    pub fn caused_by(mut self, cause: ErrorInfo) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Describe a Rust error, walking its `source()` chain.
    ///
    /// Frames are captured from `std::backtrace` and are only present when
    /// backtraces are enabled (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        let mut info = Self::new(std::any::type_name::<E>(), err.to_string())
            .with_frames(captured_frames());
        info.cause = err.source().map(|source| Box::new(Self::from_source(source)));
        info
    }

    fn from_source(err: &(dyn Error + 'static)) -> Self {
        let mut info = Self::new(source_type_name(err), err.to_string());
        info.cause = err.source().map(|source| Box::new(Self::from_source(source)));
        info
    }

    /// Iterate over this error and all of its causes
    pub fn chain(&self) -> impl Iterator<Item = &ErrorInfo> {
        std::iter::successors(Some(self), |info| info.cause.as_deref())
    }
}

/// Best-effort type name for an error only known as `dyn Error`
fn source_type_name(err: &(dyn Error + 'static)) -> &'static str {
    if err.is::<std::io::Error>() {
        "std::io::Error"
    } else if err.is::<std::fmt::Error>() {
        "std::fmt::Error"
    } else {
        "Error"
    }
}

fn captured_frames() -> Vec<String> {
    let backtrace = Backtrace::capture();
    if backtrace.status() != BacktraceStatus::Captured {
        return Vec::new();
    }
    backtrace
        .to_string()
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// A single log event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    timestamp: DateTime<Local>,
    severity: Severity,
    thread: String,
    class: String,
    message: String,
    error: Option<ErrorInfo>,
}

impl LogEvent {
    /// Create an event stamped with the current time and thread
    pub fn new(severity: Severity, class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            thread: current_thread_name(),
            class: class.into(),
            message: message.into(),
            error: None,
        }
    }

    /// Attach an error
    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    /// Override the timestamp (replayed events, tests)
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Override the originating thread name
    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Local calendar day of the event, used as the rotation day key
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn thread(&self) -> &str {
        &self.thread
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }
}

fn current_thread_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct ConfigError {
        source: io::Error,
    }

    impl fmt::Display for ConfigError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "could not read settings")
        }
    }

    impl Error for ConfigError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Severe);
        assert!(Severity::Info < Severity::Severe);
    }

    #[test]
    fn test_severity_display_padding() {
        assert_eq!(format!("{:<7}|", Severity::Info), "INFO   |");
        assert_eq!(format!("{:<7}|", Severity::Warning), "WARNING|");
        assert_eq!(Severity::Severe.to_string(), "SEVERE");
    }

    #[test]
    fn test_tracing_level_mapping() {
        assert_eq!(
            Severity::from_tracing(tracing::Level::ERROR),
            Some(Severity::Severe)
        );
        assert_eq!(
            Severity::from_tracing(tracing::Level::WARN),
            Some(Severity::Warning)
        );
        assert_eq!(
            Severity::from_tracing(tracing::Level::INFO),
            Some(Severity::Info)
        );
        assert_eq!(Severity::from_tracing(tracing::Level::DEBUG), None);
    }

    #[test]
    fn test_event_captures_thread_name() {
        let handle = std::thread::Builder::new()
            .name("worker-1".to_string())
            .spawn(|| LogEvent::new(Severity::Info, "Worker", "started"))
            .unwrap();
        let event = handle.join().unwrap();
        assert_eq!(event.thread(), "worker-1");
        assert_eq!(event.class(), "Worker");
        assert_eq!(event.message(), "started");
    }

    #[test]
    fn test_error_info_from_error_walks_sources() {
        let err = ConfigError {
            source: io::Error::new(io::ErrorKind::NotFound, "settings.json missing"),
        };
        let info = ErrorInfo::from_error(&err);

        assert!(info.type_name.ends_with("ConfigError"));
        assert_eq!(info.message, "could not read settings");

        let chain: Vec<_> = info.chain().collect();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].type_name, "std::io::Error");
        assert_eq!(chain[1].message, "settings.json missing");
    }
}
