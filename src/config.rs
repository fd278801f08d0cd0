//! Configuration management for desklog
//!
//! Settings live in `logging.toml` inside the user data directory. Severity
//! thresholds are fixed and deliberately absent from the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::app_data::AppDirs;
use crate::logging::rotation::{DEFAULT_MAX_BYTES, DEFAULT_MAX_FILES_PER_DAY};
use crate::logging::{
    LogSettings, RotationPolicy, DEFAULT_MAX_STACK_FRAMES, DEFAULT_RETENTION_DAYS,
};

/// Name of the configuration file inside the user data directory
pub const CONFIG_FILE_NAME: &str = "logging.toml";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Size threshold per log file in bytes (default: 10 MiB)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Log files kept per day before the oldest is deleted (default: 5)
    #[serde(default = "default_max_files_per_day")]
    pub max_files_per_day: usize,

    /// Stack frames printed per exception before truncating (default: 10)
    #[serde(default = "default_max_stack_frames")]
    pub max_stack_frames: usize,

    /// Days of log files kept on disk (default: 7)
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_max_files_per_day() -> usize {
    DEFAULT_MAX_FILES_PER_DAY
}

fn default_max_stack_frames() -> usize {
    DEFAULT_MAX_STACK_FRAMES
}

fn default_retention_days() -> u64 {
    DEFAULT_RETENTION_DAYS
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_files_per_day: default_max_files_per_day(),
            max_stack_frames: default_max_stack_frames(),
            retention_days: default_retention_days(),
        }
    }
}

impl LoggingConfig {
    /// Load configuration from `path`, or return defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.max_file_bytes, self.max_files_per_day)
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            rotation: self.rotation_policy(),
            max_stack_frames: self.max_stack_frames,
        }
    }
}

/// Get the path to the config file for an application
pub fn config_file_path(dirs: &AppDirs) -> PathBuf {
    dirs.data_file_path(CONFIG_FILE_NAME)
}
