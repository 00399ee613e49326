//! Filesystem access used by the backup pipeline.
//!
//! Planning, disk-space checks and archive writing only talk to the disk
//! through [`FileStore`], so they can run against an in-memory store in
//! tests.

use super::metadata::StoreEntry;
use super::walker::BreadthFirstWalk;
use crate::utils::{BackupError, Result};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Iterator returned by [`FileStore::list_recursive`].
pub type EntryIter<'a> = Box<dyn Iterator<Item = Result<StoreEntry>> + 'a>;

pub trait FileStore {
    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn size_of(&self, path: &Path) -> Result<u64>;

    fn last_modified(&self, path: &Path) -> Result<SystemTime>;

    /// Every file and directory below `root`, breadth-first, root excluded.
    fn list_recursive<'a>(&'a self, root: &Path) -> EntryIter<'a>;

    /// Bytes available to the current user on the filesystem holding `path`.
    fn available_space(&self, path: &Path) -> Result<u64>;

    fn read_all(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace `path` with `bytes` in one step: readers see either the old
    /// content or the complete new content.
    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// [`FileStore`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        LocalStore
    }
}

impl FileStore for LocalStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn size_of(&self, path: &Path) -> Result<u64> {
        let metadata = std::fs::metadata(path).map_err(|e| BackupError::io(path, e))?;
        Ok(metadata.len())
    }

    fn last_modified(&self, path: &Path) -> Result<SystemTime> {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| BackupError::io(path, e))
    }

    fn list_recursive<'a>(&'a self, root: &Path) -> EntryIter<'a> {
        Box::new(BreadthFirstWalk::new(root))
    }

    fn available_space(&self, path: &Path) -> Result<u64> {
        fs4::available_space(path).map_err(|e| BackupError::io(path, e))
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| BackupError::io(path, e))
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        // Staged next to the target so the final rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(dir).map_err(|e| BackupError::io(dir, e))?;
        staged
            .write_all(bytes)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| BackupError::io(staged.path(), e))?;

        staged
            .persist(path)
            .map_err(|e| BackupError::io(path, e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::metadata::EntryKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_queries() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, b"hello").unwrap();
        let store = LocalStore::new();

        assert!(store.exists(&file));
        assert!(store.is_file(&file));
        assert!(!store.is_dir(&file));
        assert!(store.is_dir(temp_dir.path()));
        assert_eq!(store.size_of(&file)?, 5);
        assert!(store.last_modified(&file)? > SystemTime::UNIX_EPOCH);
        assert_eq!(store.read_all(&file)?, b"hello");
        assert!(store.available_space(temp_dir.path())? > 0);
        Ok(())
    }

    #[test]
    fn test_list_recursive() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub/inner.txt"), b"x").unwrap();

        let store = LocalStore::new();
        let entries: Vec<_> = store.list_recursive(temp_dir.path()).collect::<Result<_>>()?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[1].kind, EntryKind::File);
        Ok(())
    }

    #[test]
    fn test_write_all_replaces_existing() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.zip");
        fs::write(&target, b"old content that is longer").unwrap();

        let store = LocalStore::new();
        store.write_all(&target, b"new")?;

        assert_eq!(fs::read(&target).unwrap(), b"new");
        // Only the target remains; the staging file was renamed into place.
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
        Ok(())
    }

    #[test]
    fn test_write_all_missing_directory_leaves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("missing/out.zip");

        let store = LocalStore::new();
        assert!(store.write_all(&target, b"data").is_err());
        assert!(!target.exists());
    }
}
