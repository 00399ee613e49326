//! In-memory [`FileStore`] for tests.
//!
//! Listings come out in reverse breadth-first order so callers cannot
//! depend on enumeration order.

use super::metadata::StoreEntry;
use super::store::{EntryIter, FileStore};
use crate::utils::{BackupError, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug)]
pub struct MemoryStore {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
    available: u64,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
            dirs: BTreeSet::from([root.into()]),
            unreadable: BTreeSet::new(),
            available: u64::MAX,
            fail_writes: false,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &[u8]) -> Self {
        let path = path.into();
        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
            parent = dir.parent();
        }
        self.files.get_mut().insert(path, content.to_vec());
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.insert(path.into());
        self
    }

    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }

    pub fn with_available(mut self, available: u64) -> Self {
        self.available = available;
        self
    }

    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    fn depth(path: &Path) -> usize {
        path.components().count()
    }
}

impl FileStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn size_of(&self, path: &Path) -> Result<u64> {
        self.files
            .borrow()
            .get(path)
            .map(|c| c.len() as u64)
            .ok_or_else(|| BackupError::NotFound(path.to_path_buf()))
    }

    fn last_modified(&self, path: &Path) -> Result<SystemTime> {
        if !self.exists(path) {
            return Err(BackupError::NotFound(path.to_path_buf()));
        }
        // 2020-09-13T12:26:40Z
        Ok(SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000))
    }

    fn list_recursive<'a>(&'a self, root: &Path) -> EntryIter<'a> {
        let mut entries: Vec<StoreEntry> = self
            .dirs
            .iter()
            .filter(|d| d.starts_with(root) && d.as_path() != root)
            .map(|d| StoreEntry::directory(d.clone()))
            .chain(
                self.files
                    .borrow()
                    .iter()
                    .filter(|(p, _)| p.starts_with(root))
                    .map(|(p, c)| StoreEntry::file(p.clone(), c.len() as u64)),
            )
            .collect();

        entries.sort_by(|a, b| {
            Self::depth(&a.path)
                .cmp(&Self::depth(&b.path))
                .then_with(|| a.path.cmp(&b.path))
        });
        entries.reverse();

        Box::new(entries.into_iter().map(Ok))
    }

    fn available_space(&self, _path: &Path) -> Result<u64> {
        Ok(self.available)
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        if self.unreadable.contains(path) {
            return Err(BackupError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| BackupError::NotFound(path.to_path_buf()))
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(BackupError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }
        self.files.borrow_mut().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}
