//! Process-wide logging context
//!
//! The application builds one [`LoggingContext`] at startup, calls
//! [`LoggingContext::initialize`] once, and hands the context (usually as an
//! `Arc`) to whatever needs to log. Tests build independent contexts.
//!
//! File output is INFO and above, console output WARNING and above. If the
//! file sink cannot be set up the context runs console-only ("degraded").

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Local;

use super::console_sink::ConsoleSink;
use super::error::LogError;
use super::event::{ErrorInfo, LogEvent, Severity};
use super::file_sink::FileSink;
use super::format::{DetailedFormatter, DEFAULT_MAX_STACK_FRAMES};
use super::rotation::RotationPolicy;

/// Minimum severity written to the log file
pub const FILE_THRESHOLD: Severity = Severity::Info;

/// Class name used for the logger's own diagnostics
const DIAGNOSTIC_CLASS: &str = "desklog";

/// Supplies the directory log files are written to
///
/// Implementations resolve a platform-specific location and create it on
/// demand; the context only checks that the result is an existing directory.
pub trait LogDirectoryProvider: Send + Sync {
    fn resolve_log_directory(&self) -> io::Result<PathBuf>;
}

impl LogDirectoryProvider for PathBuf {
    fn resolve_log_directory(&self) -> io::Result<PathBuf> {
        Ok(self.clone())
    }
}

/// Lifecycle of a [`LoggingContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingState {
    Uninitialized,
    Initializing,
    /// Both sinks active
    Ready,
    /// File sink unavailable, console only
    Degraded,
}

/// Tunables carried into the file sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub rotation: RotationPolicy,
    pub max_stack_frames: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            rotation: RotationPolicy::default(),
            max_stack_frames: DEFAULT_MAX_STACK_FRAMES,
        }
    }
}

struct Core {
    state: LoggingState,
    file: Option<Arc<FileSink>>,
}

/// Fans log events out to the file and console sinks
pub struct LoggingContext {
    provider: Box<dyn LogDirectoryProvider>,
    settings: LogSettings,
    console: ConsoleSink,
    core: RwLock<Core>,
    /// Serializes concurrent `initialize` calls
    init_lock: Mutex<()>,
}

impl LoggingContext {
    /// Create an uninitialized context writing console output to stderr
    pub fn new(provider: impl LogDirectoryProvider + 'static, settings: LogSettings) -> Self {
        Self::with_console(provider, settings, ConsoleSink::stderr())
    }

    /// Create an uninitialized context with a custom console sink
    pub fn with_console(
        provider: impl LogDirectoryProvider + 'static,
        settings: LogSettings,
        console: ConsoleSink,
    ) -> Self {
        Self {
            provider: Box::new(provider),
            settings,
            console,
            core: RwLock::new(Core {
                state: LoggingState::Uninitialized,
                file: None,
            }),
            init_lock: Mutex::new(()),
        }
    }

    /// Set up the file sink. Never fails; returns the resulting state.
    ///
    /// Calling this again while `Ready` with a working file sink does
    /// nothing. From `Degraded`, or after the file sink disabled itself, it
    /// retries opening the file sink.
    pub fn initialize(&self) -> LoggingState {
        let _init = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);

        {
            let mut core = self.core.write().unwrap_or_else(PoisonError::into_inner);
            let healthy = core.file.as_ref().map_or(false, |file| file.is_usable());
            if core.state == LoggingState::Ready && healthy {
                return LoggingState::Ready;
            }
            core.state = LoggingState::Initializing;
            core.file = None;
        }

        let opened = self.open_file_sink();

        let mut core = self.core.write().unwrap_or_else(PoisonError::into_inner);
        match opened {
            Ok(file) => {
                core.file = Some(Arc::new(file));
                core.state = LoggingState::Ready;
                LoggingState::Ready
            }
            Err(error) => {
                core.state = LoggingState::Degraded;
                drop(core);
                self.console.write(&LogEvent::new(
                    Severity::Warning,
                    DIAGNOSTIC_CLASS,
                    format!("file logging disabled, continuing console-only: {}", error),
                ));
                LoggingState::Degraded
            }
        }
    }

    fn open_file_sink(&self) -> Result<FileSink, LogError> {
        let dir = self
            .provider
            .resolve_log_directory()
            .map_err(|source| LogError::DirectoryUnavailable {
                path: PathBuf::from("<unresolved>"),
                source,
            })?;
        FileSink::open(
            dir,
            self.settings.rotation,
            DetailedFormatter::new(self.settings.max_stack_frames),
            Local::now().date_naive(),
        )
    }

    /// Deliver an event to every sink whose threshold it meets.
    ///
    /// Before initialization completes only the console receives events.
    pub fn log(&self, event: &LogEvent) {
        self.console.write(event);

        if event.severity() < FILE_THRESHOLD {
            return;
        }
        if let Some(file) = self.file_sink() {
            file.write(event);
            self.report_failures(&file);
        }
    }

    pub fn info(&self, class: &str, message: impl Into<String>) {
        self.log(&LogEvent::new(Severity::Info, class, message));
    }

    pub fn warning(&self, class: &str, message: impl Into<String>) {
        self.log(&LogEvent::new(Severity::Warning, class, message));
    }

    pub fn severe(&self, class: &str, message: impl Into<String>) {
        self.log(&LogEvent::new(Severity::Severe, class, message));
    }

    pub fn severe_with_error(&self, class: &str, message: impl Into<String>, error: ErrorInfo) {
        self.log(&LogEvent::new(Severity::Severe, class, message).with_error(error));
    }

    /// Flush console output and sync the open log file to disk
    pub fn flush(&self) {
        self.console.flush();
        if let Some(file) = self.file_sink() {
            file.flush();
            self.report_failures(&file);
        }
    }

    /// Directory currently receiving log files; `None` when not `Ready` or
    /// once the file sink has disabled itself
    pub fn log_directory(&self) -> Option<PathBuf> {
        self.file_sink()
            .filter(|file| file.is_usable())
            .map(|file| file.dir().to_path_buf())
    }

    pub fn state(&self) -> LoggingState {
        self.core
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn is_degraded(&self) -> bool {
        self.state() == LoggingState::Degraded
    }

    fn file_sink(&self) -> Option<Arc<FileSink>> {
        let core = self.core.read().unwrap_or_else(PoisonError::into_inner);
        match core.state {
            LoggingState::Ready => core.file.clone(),
            _ => None,
        }
    }

    /// Print sink failures on the console; the sink hands out each kind once
    fn report_failures(&self, file: &FileSink) {
        for error in file.drain_reports() {
            let severity = if error.is_fatal_for_sink() {
                Severity::Severe
            } else {
                Severity::Warning
            };
            self.console
                .write(&LogEvent::new(severity, DIAGNOSTIC_CLASS, error.to_string()));
        }
    }
}
