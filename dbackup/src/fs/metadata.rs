//! Entry metadata produced by directory listings.
//!
//! Every listed path is classified as a regular file or a directory, with
//! the byte size recorded for files only.

use std::path::PathBuf;
use walkdir::DirEntry;

/// Kind of a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn is_file(self) -> bool {
        self == EntryKind::File
    }

    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }
}

/// One path yielded by a recursive listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// Full path to the entry
    pub path: PathBuf,

    pub kind: EntryKind,

    /// File size in bytes (0 for directories)
    pub size: u64,
}

impl StoreEntry {
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }

    /// Create a StoreEntry from a walkdir DirEntry.
    /// Symlinks resolve to their target's size. Returns None for symlinks
    /// to directories and for broken symlinks, which are never listed.
    pub(crate) fn from_dir_entry(entry: &DirEntry) -> std::io::Result<Option<Self>> {
        let path = entry.path().to_path_buf();
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            return match std::fs::metadata(&path) {
                Ok(resolved) if resolved.is_dir() => Ok(None),
                Ok(resolved) => Ok(Some(Self::file(path, resolved.len()))),
                Err(_) => Ok(None),
            };
        }

        if file_type.is_dir() {
            return Ok(Some(Self::directory(path)));
        }

        let metadata = entry.metadata().map_err(std::io::Error::from)?;
        Ok(Some(Self::file(path, metadata.len())))
    }
}
