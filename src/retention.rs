//! Deletion of the oldest rotated files beyond the configured count.

use {
    crate::{error::LoggerError, file::Compression, rotation::Granularity},
    regex::Regex,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

#[derive(Debug)]
pub(crate) struct RetentionSweeper {
    directory: PathBuf,
    pattern: Regex,
    backup_count: Option<usize>,
}

impl RetentionSweeper {
    /// Build a sweeper for files named `<base>_<suffix>.log`, optionally
    /// followed by the compression extension.
    ///
    /// # Arguments
    /// * `directory` - The directory holding the log files.
    /// * `base_name` - The file base name, matched literally.
    /// * `granularity` - Selects the suffix shape to match.
    /// * `compression` - Also match files compressed with this algorithm.
    /// * `backup_count` - Files to keep; `None` disables deletion.
    pub(crate) fn new(
        directory: &Path,
        base_name: &str,
        granularity: Granularity,
        compression: Option<Compression>,
        backup_count: Option<usize>,
    ) -> Result<Self, LoggerError> {
        let compression_suffix = compression
            .map(|c| format!(r"(\.{})?", c.extension()))
            .unwrap_or_default();
        let pattern = Regex::new(&format!(
            r"^{}_{}\.log{compression_suffix}$",
            regex::escape(base_name),
            granularity.suffix_pattern()
        ))
        .map_err(|err| LoggerError::InvalidPattern(err.to_string()))?;

        Ok(RetentionSweeper {
            directory: directory.to_path_buf(),
            pattern,
            backup_count,
        })
    }

    /// Names of the regular files in the directory that match the naming
    /// pattern, oldest first.
    pub(crate) fn retention_set(&self) -> Result<Vec<String>, std::io::Error> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.directory)?.flatten() {
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.pattern.is_match(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete the oldest matching files so that at most `backup_count`
    /// remain. Failures are logged and skipped. Returns the deleted paths.
    pub(crate) fn sweep(&self) -> Vec<PathBuf> {
        let backup_count = match self.backup_count {
            Some(backup_count) => backup_count,
            None => return Vec::new(),
        };
        let names = match self.retention_set() {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(directory = %self.directory.display(), %err, "failed to list log directory");
                return Vec::new();
            }
        };
        if names.len() <= backup_count {
            return Vec::new();
        }

        let mut deleted = Vec::new();
        for name in names.iter().take(names.len() - backup_count) {
            let path = self.directory.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "removed old log file");
                    deleted.push(path);
                }
                Err(err) => tracing::warn!(path = %path.display(), %err, "failed to remove old log file"),
            }
        }
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).unwrap();
    }

    fn remaining(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn keeps_newest_daily_files() {
        let dir = tempfile::tempdir().unwrap();
        for day in ["2024-03-01", "2024-03-04", "2024-02-28", "2024-03-02", "2024-03-03"] {
            touch(dir.path(), &format!("app_{day}.log"));
        }
        let sweeper = RetentionSweeper::new(dir.path(), "app", Granularity::Day, None, Some(2)).unwrap();

        let deleted = sweeper.sweep();

        assert_eq!(deleted.len(), 3);
        assert_eq!(remaining(dir.path()), vec!["app_2024-03-03.log", "app_2024-03-04.log"]);
    }

    #[test]
    fn ignores_unrelated_entries() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app_2024-03-01.log");
        touch(dir.path(), "app_2024-03-02.log");
        touch(dir.path(), "app_2024-03-01_10.log");
        touch(dir.path(), "other_2024-03-01.log");
        touch(dir.path(), "app_2024-03-01.log.bak");
        touch(dir.path(), "xapp_2024-03-01.log");
        fs::create_dir(dir.path().join("app_2024-02-01.log")).unwrap();
        let sweeper = RetentionSweeper::new(dir.path(), "app", Granularity::Day, None, Some(1)).unwrap();

        assert_eq!(
            sweeper.retention_set().unwrap(),
            vec!["app_2024-03-01.log", "app_2024-03-02.log"]
        );
        sweeper.sweep();

        let left = remaining(dir.path());
        assert!(!left.contains(&"app_2024-03-01.log".to_string()));
        assert!(left.contains(&"app_2024-03-02.log".to_string()));
        assert!(left.contains(&"app_2024-03-01_10.log".to_string()));
        assert!(left.contains(&"other_2024-03-01.log".to_string()));
        assert!(left.contains(&"app_2024-03-01.log.bak".to_string()));
        assert!(left.contains(&"xapp_2024-03-01.log".to_string()));
        assert!(left.contains(&"app_2024-02-01.log".to_string()));
    }

    #[test]
    fn nothing_deleted_at_or_below_backup_count() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app_2024-03-01_10-00.log");
        touch(dir.path(), "app_2024-03-01_10-01.log");
        let sweeper = RetentionSweeper::new(dir.path(), "app", Granularity::Minute, None, Some(2)).unwrap();
        assert!(sweeper.sweep().is_empty());
        assert_eq!(remaining(dir.path()).len(), 2);
    }

    #[test]
    fn unlimited_retention_never_deletes() {
        let dir = tempfile::tempdir().unwrap();
        for hour in 0..5 {
            touch(dir.path(), &format!("app_2024-03-01_{hour:02}.log"));
        }
        let sweeper = RetentionSweeper::new(dir.path(), "app", Granularity::Hour, None, None).unwrap();
        assert!(sweeper.sweep().is_empty());
        assert_eq!(remaining(dir.path()).len(), 5);
    }

    #[test]
    fn weekly_and_compressed_names_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app_2024-W09.log.gz");
        touch(dir.path(), "app_2024-W10.log.gz");
        touch(dir.path(), "app_2024-W11.log");
        let sweeper =
            RetentionSweeper::new(dir.path(), "app", Granularity::Week, Some(Compression::Gzip), Some(2)).unwrap();
        sweeper.sweep();
        assert_eq!(remaining(dir.path()), vec!["app_2024-W10.log.gz", "app_2024-W11.log"]);
    }

    #[test]
    fn base_name_is_matched_literally() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.b_2024-03-01.log");
        touch(dir.path(), "aXb_2024-03-01.log");
        let sweeper = RetentionSweeper::new(dir.path(), "a.b", Granularity::Day, None, Some(0)).unwrap();
        sweeper.sweep();
        assert_eq!(remaining(dir.path()), vec!["aXb_2024-03-01.log"]);
    }

    #[test]
    fn missing_directory_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let sweeper =
            RetentionSweeper::new(&dir.path().join("gone"), "app", Granularity::Day, None, Some(1)).unwrap();
        assert!(sweeper.sweep().is_empty());
    }
}
