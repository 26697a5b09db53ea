//! Snapshot file I/O.
//!
//! Snapshots are pretty-printed JSON. Writes go to a sibling temporary file
//! which is then renamed over the target, so readers never observe a
//! half-written snapshot.

use chrono::{DateTime, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{PulseError, Result};
use crate::models::{ClassifiedSnapshot, RawSnapshot};

/// Serialize `value` as pretty JSON and atomically replace `path`.
///
/// Creates the parent directory if it does not exist.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    std::fs::write(&tmp, json)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_raw(path: &Path, snapshot: &RawSnapshot) -> Result<()> {
    write_json(path, snapshot)
}

pub fn read_raw(path: &Path) -> Result<RawSnapshot> {
    read_json(path)
}

/// Read the classified snapshot. A missing file is reported as
/// [`PulseError::DataUnavailable`].
pub fn read_classified(path: &Path) -> Result<ClassifiedSnapshot> {
    if !path.exists() {
        return Err(PulseError::DataUnavailable(format!(
            "{} does not exist yet",
            path.display()
        )));
    }
    read_json(path)
}

/// Whether `path` exists and was last modified on `today` (local calendar
/// day). Any metadata error counts as "not from today".
pub fn is_from_day(path: &Path, today: NaiveDate) -> bool {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    let modified: DateTime<Local> = modified.into();
    modified.date_naive() == today
}

/// [`is_from_day`] against the current local date.
pub fn is_from_today(path: &Path) -> bool {
    is_from_day(path, Local::now().date_naive())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
