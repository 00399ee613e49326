//! Dated archive names.
//!
//! `/home/me/project` backed up on 2026-10-16 becomes
//! `project-2026-10-16.zip`.

use crate::utils::{BackupError, Result};
use chrono::NaiveDate;
use std::path::{Component, Path, PathBuf};

/// Lexically resolve `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Absolute, normalized form of `path`.
pub fn absolute_normalized(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(BackupError::Precondition("path must not be empty".into()));
    }
    let absolute = std::path::absolute(path)
        .map_err(|e| BackupError::Precondition(format!("cannot make {} absolute: {e}", path.display())))?;
    Ok(normalize(&absolute))
}

/// Name for a snapshot of `path` taken on `date`.
pub fn dated_name_on(path: &Path, extension: Option<&str>, date: NaiveDate) -> Result<String> {
    let absolute = absolute_normalized(path)?;
    let base = match absolute.components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        _ => {
            return Err(BackupError::Precondition(format!(
                "{} has no final path segment to name a backup after",
                path.display()
            )))
        }
    };

    let mut name = format!("{}-{}", base, date.format("%Y-%m-%d"));
    if let Some(ext) = extension.filter(|e| !e.is_empty()) {
        name.push('.');
        name.push_str(ext);
    }
    Ok(name)
}

/// Name for a snapshot of `path` taken today (local time).
pub fn dated_name(path: &Path, extension: Option<&str>) -> Result<String> {
    dated_name_on(path, extension, chrono::Local::now().date_naive())
}
