//! Backup planning: what goes into the archive, and under which name.
//!
//! A plan is computed identically for real and annotate runs, so the
//! diagnostics of a dry run list exactly what a real run would archive.

use crate::fs::{EntryKind, FileStore};
use crate::ignore::Matcher;
use crate::naming::{absolute_normalized, dated_name};
use crate::utils::{BackupError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// One surviving traversal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    /// Absolute, normalized path on disk
    pub path: PathBuf,

    /// `/`-separated path relative to the source root; the archive member name
    pub member_name: String,

    pub kind: EntryKind,

    /// Size in bytes (0 for directories)
    pub size: u64,
}

/// Sorted, filtered entries of one source tree plus the archive destination.
#[derive(Debug, Clone)]
pub struct BackupPlan {
    pub source_root: PathBuf,
    pub destination: PathBuf,
    pub entries: Vec<CandidateEntry>,
    /// Entries dropped by ignore patterns
    pub excluded: usize,
}

impl BackupPlan {
    /// Entries that become archive members.
    pub fn files(&self) -> impl Iterator<Item = &CandidateEntry> {
        self.entries.iter().filter(|e| e.kind.is_file())
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Total size of the planned files.
    pub fn total_bytes(&self) -> Result<u64> {
        self.files().try_fold(0u64, |total, e| {
            total.checked_add(e.size).ok_or_else(|| {
                BackupError::Precondition("planned archive size overflows u64".into())
            })
        })
    }
}

/// `/`-joined member name for a path relative to the source root.
pub fn member_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

pub struct ArchivePlanner<'a> {
    store: &'a dyn FileStore,
    matcher: &'a Matcher,
}

impl<'a> ArchivePlanner<'a> {
    pub fn new(store: &'a dyn FileStore, matcher: &'a Matcher) -> Self {
        Self { store, matcher }
    }

    /// Plan a backup of `source` into a dated archive inside `destination_dir`.
    pub fn plan(&self, source: &Path, destination_dir: &Path) -> Result<BackupPlan> {
        let source_root = absolute_normalized(source)?;
        let name = dated_name(&source_root, Some(ARCHIVE_EXTENSION))?;
        let destination = absolute_normalized(destination_dir)?.join(name);
        self.plan_to(&source_root, destination)
    }

    /// Plan a backup of `source` into exactly `destination`.
    pub fn plan_to(&self, source: &Path, destination: PathBuf) -> Result<BackupPlan> {
        let source_root = absolute_normalized(source)?;
        let mut entries = Vec::new();
        let mut excluded = 0usize;

        for listed in self.store.list_recursive(&source_root) {
            let listed = listed?;

            if listed.path == destination {
                debug!("Skipping archive destination {}", listed.path.display());
                continue;
            }

            let relative = listed.path.strip_prefix(&source_root).map_err(|_| {
                BackupError::Precondition(format!(
                    "{} listed outside of {}",
                    listed.path.display(),
                    source_root.display()
                ))
            })?;

            if self.matcher.is_excluded(relative, listed.kind) {
                debug!("Excluded {}", relative.display());
                excluded += 1;
                continue;
            }

            entries.push(CandidateEntry {
                member_name: member_name(relative),
                path: listed.path,
                kind: listed.kind,
                size: listed.size,
            });
        }

        entries.sort_by(|a, b| a.member_name.cmp(&b.member_name));

        Ok(BackupPlan {
            source_root,
            destination,
            entries,
            excluded,
        })
    }
}
