//! Archive index rebuilt from the directory tree
//!
//! The index is a projection of `<root>/<YYYY>/<MM>/<YYYY-MM-DD>.md` and is
//! always produced by a full rescan. Nothing is carried over between
//! rebuilds, so it can only ever be stale, never inconsistent.

use crate::archive::{ArchiveError, ArchiveResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the index at the archive root
pub const METADATA_FILE: &str = "metadata.json";

/// Which dates have a persisted report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveIndex {
    /// When this index was generated
    #[serde(with = "rfc3339")]
    pub last_updated: DateTime<Utc>,

    /// year → month → sorted days
    pub years: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ArchiveIndex {
    /// Number of dates in the index
    pub fn report_count(&self) -> usize {
        self.years
            .values()
            .flat_map(|months| months.values())
            .map(Vec::len)
            .sum()
    }
}

/// Rescans the archive and stamps the index with the current time
pub fn rebuild(root: &Path) -> ArchiveResult<ArchiveIndex> {
    rebuild_at(root, Utc::now())
}

/// Rescans the archive, stamping the index with `now`
///
/// An unreadable root is an error. An unreadable year or month directory is
/// logged and left out of the index.
pub fn rebuild_at(root: &Path, now: DateTime<Utc>) -> ArchiveResult<ArchiveIndex> {
    let mut years = BTreeMap::new();

    for (year, year_dir) in numbered_dirs(root, 4)? {
        let months_in_year = match numbered_dirs(&year_dir, 2) {
            Ok(months) => months,
            Err(e) => {
                tracing::warn!("Skipping year {}: {}", year, e);
                continue;
            }
        };

        let mut months = BTreeMap::new();
        for (month, month_dir) in months_in_year {
            match report_days(&month_dir, &year, &month) {
                Ok(days) if days.is_empty() => {}
                Ok(days) => {
                    months.insert(month, days);
                }
                Err(e) => tracing::warn!("Skipping {}/{}: {}", year, month, e),
            }
        }

        if !months.is_empty() {
            years.insert(year, months);
        }
    }

    Ok(ArchiveIndex {
        last_updated: now,
        years,
    })
}

/// Writes `<root>/metadata.json`, replacing any previous index
pub fn write_index(root: &Path, index: &ArchiveIndex) -> ArchiveResult<PathBuf> {
    let path = root.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(index)?;
    fs::write(&path, json + "\n").map_err(|source| ArchiveError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(
        "Wrote {} ({} dates)",
        path.display(),
        index.report_count()
    );
    Ok(path)
}

/// Reads `<root>/metadata.json`; `None` if it does not exist yet
pub fn read_index(root: &Path) -> ArchiveResult<Option<ArchiveIndex>> {
    let path = root.join(METADATA_FILE);
    match fs::read_to_string(&path) {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ArchiveError::Read { path, source }),
    }
}

/// Subdirectories whose names are exactly `width` ASCII digits
fn numbered_dirs(dir: &Path, width: usize) -> ArchiveResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|source| ArchiveError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    Ok(readable_entries(dir, entries)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            is_digits(&name, width).then(|| (name, entry.path()))
        })
        .collect())
}

/// Sorted day components of the `YYYY-MM-DD.md` files filed under `year/month`
///
/// Reports whose date does not match the folder they sit in are ignored;
/// consumers look reports up by their dated path.
fn report_days(dir: &Path, year: &str, month: &str) -> ArchiveResult<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|source| ArchiveError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let prefix = format!("{}-{}-", year, month);
    let days: BTreeSet<String> = readable_entries(dir, entries)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            let day = name.strip_suffix(".md")?.strip_prefix(&prefix)?;
            is_digits(day, 2).then(|| day.to_string())
        })
        .collect();

    Ok(days.into_iter().collect())
}

/// Directory entries that could be read; the others are logged and dropped
fn readable_entries<'a>(dir: &'a Path, entries: fs::ReadDir) -> impl Iterator<Item = fs::DirEntry> + 'a {
    entries.filter_map(move |entry| match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
            None
        }
    })
}

fn is_digits(s: &str, width: usize) -> bool {
    s.len() == width && s.bytes().all(|b| b.is_ascii_digit())
}

/// `lastUpdated` as an RFC 3339 string with millisecond precision
mod rfc3339 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
