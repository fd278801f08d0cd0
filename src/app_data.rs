//! Application data directories
//!
//! Keeps the files shipped with the application separate from user data:
//! per-user `data/` and `logs/` directories live under a platform-specific
//! base, and bundled defaults are copied into `data/` on first run.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::logging::LogDirectoryProvider;

/// Name used when none (or a blank one) is configured
pub const DEFAULT_APP_NAME: &str = "Default App";

/// A default file shipped inside the binary
#[derive(Debug, Clone, Copy)]
pub struct BundledFile {
    /// File name inside the data directory
    pub name: &'static str,
    pub contents: &'static [u8],
}

/// Outcome of [`AppDirs::initialize_user_data_files`]
#[derive(Debug, Default)]
pub struct SeedReport {
    /// Files copied into the data directory
    pub created: Vec<PathBuf>,
    /// Files left alone because the user already has them
    pub skipped: Vec<PathBuf>,
    /// Files that could not be written, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Platform-resolved directories for one application
#[derive(Debug, Clone)]
pub struct AppDirs {
    app_name: String,
    base: PathBuf,
}

impl AppDirs {
    /// Resolve directories for `app_name` in the platform's usual location
    pub fn new(app_name: &str) -> Self {
        let app_name = sanitize_app_name(app_name);
        let base = platform_base_dir().join(&app_name);
        Self { app_name, base }
    }

    /// Root everything under an explicit directory (portable installs, tests)
    pub fn with_base(app_name: &str, base: PathBuf) -> Self {
        Self {
            app_name: sanitize_app_name(app_name),
            base,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Directory for user-modifiable data files
    pub fn user_data_dir(&self) -> PathBuf {
        self.base.join("data")
    }

    /// Directory for log files
    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }

    /// Get the full path for a file in the user data directory
    pub fn data_file_path(&self, file_name: &str) -> PathBuf {
        self.user_data_dir().join(file_name)
    }

    /// Create the user data directory if needed and return it
    pub fn ensure_user_data_dir(&self) -> Result<PathBuf> {
        let dir = self.user_data_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Copy bundled defaults into the data directory, never overwriting
    /// files that already exist (the user may have edited them).
    ///
    /// A failure on one file does not stop the others; only failing to
    /// create the data directory itself is an error.
    pub fn initialize_user_data_files(&self, files: &[BundledFile]) -> Result<SeedReport> {
        let dir = self.ensure_user_data_dir()?;
        let mut report = SeedReport::default();

        for file in files {
            let target = dir.join(file.name);
            if target.exists() {
                report.skipped.push(target);
                continue;
            }
            match std::fs::write(&target, file.contents) {
                Ok(()) => report.created.push(target),
                Err(e) => {
                    let reason = e.to_string();
                    report.failed.push((target, reason));
                }
            }
        }

        Ok(report)
    }
}

impl LogDirectoryProvider for AppDirs {
    fn resolve_log_directory(&self) -> io::Result<PathBuf> {
        let dir = self.logs_dir();
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn sanitize_app_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        DEFAULT_APP_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Windows: %LOCALAPPDATA%, macOS: ~/Library/Application Support,
/// everything else: ~/.config
fn platform_base_dir() -> PathBuf {
    #[cfg(windows)]
    let base = dirs::data_local_dir();
    #[cfg(target_os = "macos")]
    let base = dirs::data_dir();
    #[cfg(not(any(windows, target_os = "macos")))]
    let base = dirs::home_dir().map(|home| home.join(".config"));

    // Without a home directory, fall back to the working directory
    base.unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DEFAULTS: &[BundledFile] = &[
        BundledFile {
            name: "settings.json",
            contents: b"{\"theme\":\"dark\"}",
        },
        BundledFile {
            name: "profiles.json",
            contents: b"[]",
        },
    ];

    #[test]
    fn test_blank_app_name_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = AppDirs::with_base("   ", temp_dir.path().to_path_buf());
        assert_eq!(dirs.app_name(), DEFAULT_APP_NAME);

        let dirs = AppDirs::with_base("  Tracker ", temp_dir.path().to_path_buf());
        assert_eq!(dirs.app_name(), "Tracker");
    }

    #[test]
    fn test_platform_dirs_end_with_app_name() {
        let dirs = AppDirs::new("Tracker");
        assert!(dirs.base_dir().ends_with("Tracker"));
        assert!(dirs.logs_dir().ends_with("Tracker/logs"));
        assert!(dirs.user_data_dir().ends_with("Tracker/data"));
    }

    #[test]
    fn test_data_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = AppDirs::with_base("Tracker", temp_dir.path().to_path_buf());
        assert_eq!(
            dirs.data_file_path("settings.json"),
            temp_dir.path().join("data").join("settings.json")
        );
    }

    #[test]
    fn test_seed_copies_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = AppDirs::with_base("Tracker", temp_dir.path().to_path_buf());

        let report = dirs.initialize_user_data_files(DEFAULTS).unwrap();

        assert_eq!(report.created.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(
            std::fs::read_to_string(dirs.data_file_path("profiles.json")).unwrap(),
            "[]"
        );
    }

    #[test]
    fn test_seed_preserves_user_edits() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = AppDirs::with_base("Tracker", temp_dir.path().to_path_buf());
        dirs.ensure_user_data_dir().unwrap();
        std::fs::write(dirs.data_file_path("settings.json"), "{\"theme\":\"light\"}").unwrap();

        let report = dirs.initialize_user_data_files(DEFAULTS).unwrap();

        assert_eq!(report.created, vec![dirs.data_file_path("profiles.json")]);
        assert_eq!(report.skipped, vec![dirs.data_file_path("settings.json")]);
        assert_eq!(
            std::fs::read_to_string(dirs.data_file_path("settings.json")).unwrap(),
            "{\"theme\":\"light\"}"
        );
    }

    #[test]
    fn test_log_directory_is_created_on_demand() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = AppDirs::with_base("Tracker", temp_dir.path().to_path_buf());

        let resolved = dirs.resolve_log_directory().unwrap();

        assert_eq!(resolved, temp_dir.path().join("logs"));
        assert!(resolved.is_dir());
    }
}
