//! Log file retention management
//!
//! Removes rotated log files whose day is older than the retention period.
//! The per-day file cap is enforced by the file sink; this handles the days
//! that are no longer being written.

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{Days, NaiveDate};

use super::rotation::parse_file_name;

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Delete log files dated more than `retention_days` before `today`
///
/// Returns the number of files deleted. Files that are not ours are left alone.
pub fn cleanup_old_logs(logs_dir: &Path, today: NaiveDate, retention_days: u64) -> Result<usize> {
    if !logs_dir.exists() {
        return Ok(0);
    }

    let cutoff = today
        .checked_sub_days(Days::new(retention_days))
        .unwrap_or(NaiveDate::MIN);

    let mut deleted_count = 0;

    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let path = entry.path();

        let Some((date, _)) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(parse_file_name)
        else {
            continue;
        };

        if date < cutoff && fs::remove_file(&path).is_ok() {
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 21).unwrap()
    }

    #[test]
    fn test_cleanup_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let count = cleanup_old_logs(temp_dir.path(), today(), 7).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_nonexistent_dir() {
        let path = Path::new("/nonexistent/path/for/testing");
        let count = cleanup_old_logs(path, today(), 7).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_ignores_non_log_files() {
        let temp_dir = TempDir::new().unwrap();

        let other_file = temp_dir.path().join("other.txt");
        File::create(&other_file)
            .unwrap()
            .write_all(b"test")
            .unwrap();

        // Old date but foreign naming
        let wrong_prefix = temp_dir.path().join("other_2020-01-01_0.log");
        File::create(&wrong_prefix)
            .unwrap()
            .write_all(b"test")
            .unwrap();

        let count = cleanup_old_logs(temp_dir.path(), today(), 7).unwrap();
        assert_eq!(count, 0);

        assert!(other_file.exists());
        assert!(wrong_prefix.exists());
    }

    #[test]
    fn test_cleanup_removes_only_expired_days() {
        let temp_dir = TempDir::new().unwrap();
        let names = [
            "app_2026-01-10_0.log",
            "app_2026-01-10_1.log",
            "app_2026-01-14_0.log",
            "app_2026-01-21_0.log",
        ];
        for name in names {
            File::create(temp_dir.path().join(name))
                .unwrap()
                .write_all(b"test log content")
                .unwrap();
        }

        let count = cleanup_old_logs(temp_dir.path(), today(), 7).unwrap();
        assert_eq!(count, 2);

        assert!(!temp_dir.path().join("app_2026-01-10_0.log").exists());
        assert!(temp_dir.path().join("app_2026-01-14_0.log").exists());
        assert!(temp_dir.path().join("app_2026-01-21_0.log").exists());
    }
}
