//! Log file rotation policy
//!
//! Files are named `app_<YYYY-MM-DD>_<index>.log`. A new file is started when
//! the local day changes or when the next write would push the current file
//! past `max_bytes`. At most `max_files_per_day` files are kept per day; once
//! the cap is reached the lowest index for that day is deleted and indices
//! keep incrementing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Default size threshold per file (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of files retained per day
pub const DEFAULT_MAX_FILES_PER_DAY: usize = 5;

const FILE_PREFIX: &str = "app_";
const FILE_SUFFIX: &str = ".log";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of a rotation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Append to the currently open file
    NoRotation,
    /// Size threshold reached; continue with `index` on the current day
    SameDay { index: u32 },
    /// The day changed; start index 0 of `date`
    NewDay { date: NaiveDate },
}

/// Size and retention parameters for the file sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub max_files_per_day: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_files_per_day: DEFAULT_MAX_FILES_PER_DAY,
        }
    }
}

impl RotationPolicy {
    pub fn new(max_bytes: u64, max_files_per_day: usize) -> Self {
        Self {
            max_bytes,
            max_files_per_day: max_files_per_day.max(1),
        }
    }

    /// Decide whether to roll before writing `pending_bytes` dated `event_date`.
    ///
    /// Only a later day starts a new day's file. An event stamped before the
    /// current day (taken just before midnight, written just after) stays in
    /// the current file, subject to the size check like any other.
    ///
    /// An empty file never rotates for size, so a single line larger than
    /// `max_bytes` is written whole instead of rolling forever. The last
    /// representable index never rotates either.
    pub fn decide(
        &self,
        current_date: NaiveDate,
        event_date: NaiveDate,
        current_index: u32,
        current_size: u64,
        pending_bytes: u64,
    ) -> Rotation {
        if event_date > current_date {
            return Rotation::NewDay { date: event_date };
        }
        if current_size > 0 && current_size.saturating_add(pending_bytes) > self.max_bytes {
            if let Some(index) = current_index.checked_add(1) {
                return Rotation::SameDay { index };
            }
        }
        Rotation::NoRotation
    }

    /// Indices to delete before creating `new_index`, given the indices that
    /// already exist for the target day (any order).
    ///
    /// Lowest indices go first; the result keeps the day at no more than
    /// `max_files_per_day` files once `new_index` exists.
    pub fn evictions(&self, existing: &[u32], new_index: u32) -> Vec<u32> {
        let mut others: Vec<u32> = existing
            .iter()
            .copied()
            .filter(|&index| index != new_index)
            .collect();
        others.sort_unstable();
        others.dedup();

        let keep = self.max_files_per_day.saturating_sub(1);
        let excess = others.len().saturating_sub(keep);
        others.truncate(excess);
        others
    }
}

/// File name for a given day and rotation index
pub fn file_name(date: NaiveDate, index: u32) -> String {
    format!(
        "{}{}_{}{}",
        FILE_PREFIX,
        date.format(DATE_FORMAT),
        index,
        FILE_SUFFIX
    )
}

/// Full path for a given day and rotation index
pub fn file_path(dir: &Path, date: NaiveDate, index: u32) -> PathBuf {
    dir.join(file_name(date, index))
}

/// Parse `app_<YYYY-MM-DD>_<index>.log` back into its day and index
pub fn parse_file_name(name: &str) -> Option<(NaiveDate, u32)> {
    let stem = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    let (date, index) = stem.rsplit_once('_')?;
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let index = index.parse().ok()?;
    Some((date, index))
}

/// Rotation indices present in `dir` for `date`, sorted ascending
pub fn existing_indices(dir: &Path, date: NaiveDate) -> io::Result<Vec<u32>> {
    let mut indices = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // Only our own regular log files count towards the cap
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if let Some((file_date, index)) = parse_file_name(&name) {
            if file_date == date {
                indices.push(index);
            }
        }
    }

    indices.sort_unstable();
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_no_rotation_within_threshold() {
        let policy = RotationPolicy::new(100, 5);
        assert_eq!(policy.decide(day(1), day(1), 0, 60, 40), Rotation::NoRotation);
    }

    #[test]
    fn test_same_day_rotation_when_write_would_exceed() {
        let policy = RotationPolicy::new(100, 5);
        assert_eq!(
            policy.decide(day(1), day(1), 2, 60, 41),
            Rotation::SameDay { index: 3 }
        );
    }

    #[test]
    fn test_new_day_wins_over_size() {
        let policy = RotationPolicy::new(100, 5);
        assert_eq!(
            policy.decide(day(1), day(2), 4, 10, 10),
            Rotation::NewDay { date: day(2) }
        );
        assert_eq!(
            policy.decide(day(1), day(2), 4, 99, 50),
            Rotation::NewDay { date: day(2) }
        );
    }

    #[test]
    fn test_earlier_day_stays_in_current_file() {
        let policy = RotationPolicy::new(100, 5);
        assert_eq!(policy.decide(day(2), day(1), 6, 10, 10), Rotation::NoRotation);
        assert_eq!(
            policy.decide(day(2), day(1), 6, 95, 10),
            Rotation::SameDay { index: 7 }
        );
    }

    #[test]
    fn test_last_index_does_not_overflow() {
        let policy = RotationPolicy::new(100, 5);
        assert_eq!(
            policy.decide(day(1), day(1), u32::MAX, 95, 10),
            Rotation::NoRotation
        );
    }

    #[test]
    fn test_empty_file_never_rotates_for_size() {
        let policy = RotationPolicy::new(100, 5);
        assert_eq!(policy.decide(day(1), day(1), 0, 0, 500), Rotation::NoRotation);
    }

    #[test]
    fn test_evictions_below_cap() {
        let policy = RotationPolicy::new(100, 5);
        assert!(policy.evictions(&[0, 1, 2, 3], 4).is_empty());
    }

    #[test]
    fn test_evictions_at_cap_removes_lowest() {
        let policy = RotationPolicy::new(100, 5);
        assert_eq!(policy.evictions(&[3, 1, 0, 2, 4], 5), vec![0]);
        assert_eq!(policy.evictions(&[1, 2, 3, 4, 5], 6), vec![1]);
    }

    #[test]
    fn test_evictions_over_cap_trims_to_cap() {
        let policy = RotationPolicy::new(100, 2);
        assert_eq!(policy.evictions(&[0, 1, 2, 3], 4), vec![0, 1, 2]);
    }

    #[test]
    fn test_evictions_ignore_reused_index() {
        let policy = RotationPolicy::new(100, 2);
        assert!(policy.evictions(&[0, 7], 0).is_empty());
    }

    #[test]
    fn test_file_name_template() {
        assert_eq!(file_name(day(21), 0), "app_2026-01-21_0.log");
        assert_eq!(parse_file_name("app_2026-01-21_12.log"), Some((day(21), 12)));
        assert_eq!(parse_file_name("tracker-2026-01-21.log"), None);
        assert_eq!(parse_file_name("app_2026-01-21_x.log"), None);
    }

    #[test]
    fn test_existing_indices_filters_by_date() {
        let temp_dir = TempDir::new().unwrap();
        for name in [
            "app_2026-01-01_2.log",
            "app_2026-01-01_0.log",
            "app_2026-01-02_0.log",
            "notes.txt",
        ] {
            File::create(temp_dir.path().join(name)).unwrap();
        }

        let indices = existing_indices(temp_dir.path(), day(1)).unwrap();
        assert_eq!(indices, vec![0, 2]);
    }
}
