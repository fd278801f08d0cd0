//! Failure taxonomy for the logging sinks
//!
//! None of these ever reach the application: sinks contain them and the
//! context reports each kind at most once per sink lifetime.

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;

/// Errors raised inside the logging sinks
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The log directory could not be resolved or is not a usable directory
    #[error("log directory unavailable at {path}: {source}")]
    DirectoryUnavailable { path: PathBuf, source: io::Error },

    /// A log file could not be opened
    #[error("failed to open log file {path}: {source}")]
    FileOpenFailure { path: PathBuf, source: io::Error },

    /// Appending to (or flushing) the open log file failed
    #[error("failed to write log file {path}: {source}")]
    WriteFailure { path: PathBuf, source: io::Error },

    /// An evicted log file could not be deleted during rotation
    #[error("failed to remove rotated log file {path}: {source}")]
    RotationFailure { path: PathBuf, source: io::Error },
}

/// Discriminant of [`LogError`], used for rate-limiting reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    DirectoryUnavailable,
    FileOpenFailure,
    WriteFailure,
    RotationFailure,
}

impl LogError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LogError::DirectoryUnavailable { .. } => FailureKind::DirectoryUnavailable,
            LogError::FileOpenFailure { .. } => FailureKind::FileOpenFailure,
            LogError::WriteFailure { .. } => FailureKind::WriteFailure,
            LogError::RotationFailure { .. } => FailureKind::RotationFailure,
        }
    }

    /// Whether the sink can keep writing after this failure
    pub fn is_fatal_for_sink(&self) -> bool {
        !matches!(self, LogError::RotationFailure { .. })
    }
}

/// Remembers which failure kinds a sink has already reported
#[derive(Debug, Default)]
pub struct FailureLedger {
    reported: HashSet<FailureKind>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure, returning `true` only the first time its kind is seen
    pub fn first_report(&mut self, error: &LogError) -> bool {
        self.reported.insert(error.kind())
    }
}
