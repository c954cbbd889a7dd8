use crate::archive::{ArchiveError, ArchiveResult};
use crate::config::SweepTrigger;
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Year/month partitioned report archive rooted at one directory
///
/// The filesystem is the store of record. Operations are not safe against
/// another process writing the same archive concurrently.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    root: PathBuf,
}

impl ArchiveStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<YYYY>/<MM>/<YYYY-MM-DD>.md`, without touching the filesystem
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.month_dir(date).join(report_file_name(date))
    }

    /// Report path for `date`, creating the year/month directories if needed
    ///
    /// Idempotent: existing directories are not an error.
    pub fn resolve_path(&self, date: NaiveDate) -> ArchiveResult<PathBuf> {
        let dir = self.month_dir(date);
        fs::create_dir_all(&dir).map_err(|source| ArchiveError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(dir.join(report_file_name(date)))
    }

    /// Writes a report, replacing any previous report at `path`
    pub fn write(&self, path: &Path, content: &str) -> ArchiveResult<()> {
        fs::write(path, content).map_err(|source| ArchiveError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Wrote report to {}", path.display());
        Ok(())
    }

    /// Whether a run dated `date` should file loose reports away
    pub fn should_sweep(trigger: SweepTrigger, date: NaiveDate) -> bool {
        match trigger {
            SweepTrigger::Always => true,
            SweepTrigger::FirstOfMonth => date.day() == 1,
            SweepTrigger::Never => false,
        }
    }

    /// Moves `<root>/<YYYY-MM-DD>.md` files into their year/month folders
    ///
    /// Files are renamed, never copied. A missing root or an archive with
    /// nothing loose is a no-op. A loose file whose dated path already holds
    /// a report is left where it is, so a filed report is never replaced.
    ///
    /// # Returns
    ///
    /// The destination paths of the moved files, sorted
    pub fn archive_stale_files(&self) -> ArchiveResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|source| ArchiveError::ReadDir {
            path: self.root.clone(),
            source,
        })?;

        let mut moved = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", self.root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(date) = report_date(&path) else {
                continue;
            };

            let destination = self.resolve_path(date)?;
            if destination.exists() {
                tracing::warn!(
                    "Not archiving {}: {} already exists",
                    path.display(),
                    destination.display()
                );
                continue;
            }
            fs::rename(&path, &destination).map_err(|source| ArchiveError::Move {
                from: path.clone(),
                to: destination.clone(),
                source,
            })?;
            tracing::info!("Archived {} to {}", path.display(), destination.display());
            moved.push(destination);
        }

        moved.sort();
        Ok(moved)
    }

    fn month_dir(&self, date: NaiveDate) -> PathBuf {
        self.root
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
    }
}

fn report_file_name(date: NaiveDate) -> String {
    format!("{}.md", date.format(DATE_FORMAT))
}

/// Date of a report file named exactly `YYYY-MM-DD.md`
fn report_date(path: &Path) -> Option<NaiveDate> {
    if path.extension()? != "md" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let date = NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == stem).then_some(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_resolve_path_layout() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path());

        let path = store.resolve_path(date("2024-03-07")).unwrap();

        assert_eq!(path, dir.path().join("2024").join("03").join("2024-03-07.md"));
        assert!(dir.path().join("2024").join("03").is_dir());
    }

    #[test]
    fn test_resolve_path_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path());

        let first = store.resolve_path(date("2024-03-07")).unwrap();
        let second = store.resolve_path(date("2024-03-07")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_report_path_is_pure() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path().join("missing"));

        let path = store.report_path(date("2023-12-31"));

        assert!(path.ends_with("2023/12/2023-12-31.md"));
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path());
        let path = store.resolve_path(date("2024-01-02")).unwrap();

        store.write(&path, "first run").unwrap();
        store.write(&path, "second run").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second run");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path());
        let path = dir.path().join("nope").join("2024-01-02.md");

        assert!(matches!(
            store.write(&path, "x"),
            Err(ArchiveError::Write { .. })
        ));
    }

    #[test]
    fn test_should_sweep() {
        assert!(ArchiveStore::should_sweep(SweepTrigger::FirstOfMonth, date("2024-04-01")));
        assert!(!ArchiveStore::should_sweep(SweepTrigger::FirstOfMonth, date("2024-04-02")));
        assert!(ArchiveStore::should_sweep(SweepTrigger::Always, date("2024-04-02")));
        assert!(!ArchiveStore::should_sweep(SweepTrigger::Never, date("2024-04-01")));
    }

    #[test]
    fn test_archive_stale_files_moves_loose_reports() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("2024-02-28.md"), "feb").unwrap();
        fs::write(dir.path().join("2024-03-01.md"), "mar").unwrap();
        fs::write(dir.path().join("README.md"), "keep").unwrap();
        fs::write(dir.path().join("metadata.json"), "{}").unwrap();
        let store = ArchiveStore::new(dir.path());

        let moved = store.archive_stale_files().unwrap();

        assert_eq!(
            moved,
            vec![
                dir.path().join("2024/02/2024-02-28.md"),
                dir.path().join("2024/03/2024-03-01.md"),
            ]
        );
        assert_eq!(fs::read_to_string(dir.path().join("2024/02/2024-02-28.md")).unwrap(), "feb");
        assert!(!dir.path().join("2024-02-28.md").exists());
        assert!(dir.path().join("README.md").exists());
        assert!(dir.path().join("metadata.json").exists());
    }

    #[test]
    fn test_archive_stale_files_noop_cases() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path());
        assert!(store.archive_stale_files().unwrap().is_empty());

        let missing = ArchiveStore::new(dir.path().join("missing"));
        assert!(missing.archive_stale_files().unwrap().is_empty());
    }

    #[test]
    fn test_archive_leaves_filed_reports_alone() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path());
        let path = store.resolve_path(date("2024-03-07")).unwrap();
        store.write(&path, "filed").unwrap();

        assert!(store.archive_stale_files().unwrap().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_archive_never_replaces_filed_report() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path());
        let filed = store.resolve_path(date("2024-03-01")).unwrap();
        store.write(&filed, "filed").unwrap();
        fs::write(dir.path().join("2024-03-01.md"), "loose").unwrap();
        fs::write(dir.path().join("2024-03-02.md"), "other").unwrap();

        let moved = store.archive_stale_files().unwrap();

        assert_eq!(moved, vec![dir.path().join("2024/03/2024-03-02.md")]);
        assert_eq!(fs::read_to_string(&filed).unwrap(), "filed");
        assert_eq!(fs::read_to_string(dir.path().join("2024-03-01.md")).unwrap(), "loose");
    }

    #[test]
    fn test_report_date_requires_exact_name() {
        assert_eq!(report_date(Path::new("2024-03-07.md")), Some(date("2024-03-07")));
        assert_eq!(report_date(Path::new("2024-3-7.md")), None);
        assert_eq!(report_date(Path::new("2024-03-07.txt")), None);
        assert_eq!(report_date(Path::new("2024-02-30.md")), None);
        assert_eq!(report_date(Path::new("notes.md")), None);
    }
}
