//! Rotating file sink
//!
//! Owns at most one open log file. The rotation decision, any eviction and
//! the append itself happen under a single lock, so two writers can never
//! both roll over the same boundary and no line lands in a file after it
//! has been rotated away.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use super::error::{FailureLedger, LogError};
use super::event::LogEvent;
use super::format::DetailedFormatter;
use super::rotation::{self, Rotation, RotationPolicy};

/// The file currently being appended to
struct OpenFile {
    date: NaiveDate,
    index: u32,
    size: u64,
    path: PathBuf,
    writer: BufWriter<File>,
}

struct FileState {
    current: Option<OpenFile>,
    usable: bool,
    ledger: FailureLedger,
    /// Failures not yet handed to the context for reporting
    pending_reports: Vec<LogError>,
}

impl FileState {
    fn record(&mut self, error: LogError) {
        if error.is_fatal_for_sink() {
            self.usable = false;
            self.current = None;
        }
        if self.ledger.first_report(&error) {
            self.pending_reports.push(error);
        }
    }
}

/// Writes detailed log lines to `app_<date>_<index>.log` files
pub struct FileSink {
    dir: PathBuf,
    policy: RotationPolicy,
    formatter: DetailedFormatter,
    state: Mutex<FileState>,
    remove_file: fn(&Path) -> io::Result<()>,
}

impl FileSink {
    /// Open the sink in `dir`, resuming the highest existing index for `today`.
    ///
    /// Fails when `dir` is not an existing directory or the file cannot be
    /// opened; the caller decides how to degrade.
    pub fn open(
        dir: PathBuf,
        policy: RotationPolicy,
        formatter: DetailedFormatter,
        today: NaiveDate,
    ) -> Result<Self, LogError> {
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(LogError::DirectoryUnavailable {
                    source: io::Error::new(
                        io::ErrorKind::Other,
                        "path is not a directory",
                    ),
                    path: dir,
                })
            }
            Err(source) => return Err(LogError::DirectoryUnavailable { path: dir, source }),
        }

        let index = rotation::existing_indices(&dir, today)
            .map_err(|source| LogError::DirectoryUnavailable {
                path: dir.clone(),
                source,
            })?
            .last()
            .copied()
            .unwrap_or(0);
        let current = open_file(&dir, today, index)?;

        Ok(Self {
            dir,
            policy,
            formatter,
            state: Mutex::new(FileState {
                current: Some(current),
                usable: true,
                ledger: FailureLedger::new(),
                pending_reports: Vec::new(),
            }),
            remove_file: remove_log_file,
        })
    }

    #[cfg(test)]
    fn with_remover(mut self, remove_file: fn(&Path) -> io::Result<()>) -> Self {
        self.remove_file = remove_file;
        self
    }

    /// Directory the sink writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file currently open, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        self.lock().current.as_ref().map(|f| f.path.clone())
    }

    /// Whether the sink is still accepting writes
    pub fn is_usable(&self) -> bool {
        self.lock().usable
    }

    /// Format and append an event, rotating first when needed.
    ///
    /// Failures are recorded, never returned; after a fatal one the sink
    /// ignores writes until it is reopened.
    pub fn write(&self, event: &LogEvent) {
        let line = self.formatter.format(event);
        let mut state = self.lock();
        if !state.usable {
            return;
        }
        if let Err(error) = self.write_locked(&mut state, event.date(), line.as_bytes()) {
            state.record(error);
        }
    }

    fn write_locked(
        &self,
        state: &mut FileState,
        event_date: NaiveDate,
        bytes: &[u8],
    ) -> Result<(), LogError> {
        let pending = bytes.len() as u64;
        let (current_date, decision) = match &state.current {
            Some(file) => (
                file.date,
                self.policy
                    .decide(file.date, event_date, file.index, file.size, pending),
            ),
            None => (event_date, Rotation::NewDay { date: event_date }),
        };

        match decision {
            Rotation::NoRotation => {}
            Rotation::SameDay { index } => self.roll_over(state, current_date, index)?,
            Rotation::NewDay { date } => self.roll_over(state, date, 0)?,
        }

        let Some(file) = state.current.as_mut() else {
            return Ok(());
        };
        let result = file.writer.write_all(bytes).and_then(|_| file.writer.flush());
        match result {
            Ok(()) => {
                file.size += pending;
                Ok(())
            }
            Err(source) => Err(LogError::WriteFailure {
                path: file.path.clone(),
                source,
            }),
        }
    }

    /// Close the current file, evict old files for `date` and open `index`
    fn roll_over(&self, state: &mut FileState, date: NaiveDate, index: u32) -> Result<(), LogError> {
        if let Some(mut old) = state.current.take() {
            old.writer.flush().map_err(|source| LogError::WriteFailure {
                path: old.path.clone(),
                source,
            })?;
        }

        // A failed scan only means nothing gets evicted this time
        let existing = match rotation::existing_indices(&self.dir, date) {
            Ok(indices) => indices,
            Err(source) => {
                state.record(LogError::RotationFailure {
                    path: self.dir.clone(),
                    source,
                });
                Vec::new()
            }
        };
        for stale in self.policy.evictions(&existing, index) {
            let path = rotation::file_path(&self.dir, date, stale);
            if let Err(source) = (self.remove_file)(&path) {
                state.record(LogError::RotationFailure { path, source });
            }
        }

        state.current = Some(open_file(&self.dir, date, index)?);
        Ok(())
    }

    /// Push buffered bytes to the OS and sync file data to disk
    pub fn flush(&self) {
        let mut state = self.lock();
        let Some(file) = state.current.as_mut() else {
            return;
        };
        let result = file
            .writer
            .flush()
            .and_then(|_| file.writer.get_ref().sync_data());
        if let Err(source) = result {
            let path = file.path.clone();
            state.record(LogError::WriteFailure { path, source });
        }
    }

    /// Take failures that have not been reported yet (each kind appears once)
    pub fn drain_reports(&self) -> Vec<LogError> {
        std::mem::take(&mut self.lock().pending_reports)
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn remove_log_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

fn open_file(dir: &Path, date: NaiveDate, index: u32) -> Result<OpenFile, LogError> {
    let path = rotation::file_path(dir, date, index);
    let opened = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|file| file.metadata().map(|meta| (file, meta.len())));

    match opened {
        Ok((file, size)) => Ok(OpenFile {
            date,
            index,
            size,
            path,
            writer: BufWriter::new(file),
        }),
        Err(source) => Err(LogError::FileOpenFailure { path, source }),
    }
}
