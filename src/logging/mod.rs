//! Logging facility for desktop applications
//!
//! Two fixed sinks: a rotating file sink (`app_<date>_<index>.log`, INFO and
//! above, detailed format) and a console sink (WARNING and above, simplified
//! format). Both are driven through a [`LoggingContext`].

pub mod bridge;
mod console_sink;
mod context;
mod error;
mod event;
mod file_sink;
mod format;
mod retention;
pub mod rotation;

pub use bridge::{install_tracing, LoggingLayer};
pub use console_sink::{ConsoleSink, CONSOLE_THRESHOLD};
pub use context::{LogDirectoryProvider, LogSettings, LoggingContext, LoggingState, FILE_THRESHOLD};
pub use error::{FailureKind, FailureLedger, LogError};
pub use event::{ErrorInfo, LogEvent, Severity};
pub use file_sink::FileSink;
pub use format::{format_simple, DetailedFormatter, DEFAULT_MAX_STACK_FRAMES, TIMESTAMP_FORMAT};
pub use retention::{cleanup_old_logs, DEFAULT_RETENTION_DAYS};
pub use rotation::{Rotation, RotationPolicy};
