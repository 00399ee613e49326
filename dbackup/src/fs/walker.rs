//! Breadth-first directory traversal.
//!
//! The walk is lazy: each directory is listed only when the walk reaches
//! its level, and the iterator cannot be restarted once consumed.

use super::metadata::StoreEntry;
use crate::utils::{BackupError, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazy breadth-first listing of everything below a root directory.
///
/// The root itself is not yielded. Children of one directory come out in
/// file-name order; consumers that need a stable overall order still sort.
pub struct BreadthFirstWalk {
    pending_dirs: VecDeque<PathBuf>,
    ready: VecDeque<StoreEntry>,
    failed: bool,
}

impl BreadthFirstWalk {
    pub fn new(root: &Path) -> Self {
        Self {
            pending_dirs: VecDeque::from([root.to_path_buf()]),
            ready: VecDeque::new(),
            failed: false,
        }
    }

    /// List the direct children of `dir` into the ready queue, scheduling
    /// subdirectories for a later level.
    fn expand(&mut self, dir: &Path) -> Result<()> {
        let listing = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in listing {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                BackupError::io(path, std::io::Error::from(e))
            })?;

            let listed = StoreEntry::from_dir_entry(&entry)
                .map_err(|e| BackupError::io(entry.path(), e))?;

            if let Some(store_entry) = listed {
                if store_entry.kind.is_dir() {
                    self.pending_dirs.push_back(store_entry.path.clone());
                }
                self.ready.push_back(store_entry);
            }
        }

        Ok(())
    }
}

impl Iterator for BreadthFirstWalk {
    type Item = Result<StoreEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(entry) = self.ready.pop_front() {
                return Some(Ok(entry));
            }

            let dir = self.pending_dirs.pop_front()?;
            if let Err(e) = self.expand(&dir) {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

/// Sum the sizes of every file below `root`, failing instead of wrapping
/// when the total does not fit in a u64.
pub fn total_file_size<I>(entries: I) -> Result<u64>
where
    I: IntoIterator<Item = Result<StoreEntry>>,
{
    let mut total = 0u64;

    for entry in entries {
        let entry = entry?;
        if !entry.kind.is_file() {
            continue;
        }
        total = total.checked_add(entry.size).ok_or_else(|| {
            BackupError::Precondition(format!(
                "total source size overflows u64 at {}",
                entry.path.display()
            ))
        })?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::metadata::EntryKind;
    use std::fs;
    use tempfile::TempDir;

    fn relative(root: &Path, entries: &[StoreEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_walk_empty_directory() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let entries: Vec<_> = BreadthFirstWalk::new(temp_dir.path()).collect::<Result<_>>()?;
        assert!(entries.is_empty());
        Ok(())
    }

    #[test]
    fn test_walk_is_breadth_first() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/deep")).unwrap();
        fs::create_dir(root.join("b")).unwrap();
        fs::write(root.join("a/deep/leaf.txt"), b"x").unwrap();
        fs::write(root.join("a/one.txt"), b"x").unwrap();
        fs::write(root.join("z.txt"), b"x").unwrap();

        let entries: Vec<_> = BreadthFirstWalk::new(root).collect::<Result<_>>()?;
        assert_eq!(
            relative(root, &entries),
            vec!["a", "b", "z.txt", "a/deep", "a/one.txt", "a/deep/leaf.txt"]
        );
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[2].kind, EntryKind::File);
        Ok(())
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let mut walk = BreadthFirstWalk::new(Path::new("/nonexistent_path_12345"));
        assert!(matches!(walk.next(), Some(Err(_))));
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_total_file_size_skips_directories() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("file1.txt"), b"12345").unwrap();
        fs::write(temp_dir.path().join("sub/file2.txt"), b"1234567").unwrap();

        let total = total_file_size(BreadthFirstWalk::new(temp_dir.path()))?;
        assert_eq!(total, 12);
        Ok(())
    }

    #[test]
    fn test_total_file_size_detects_overflow() {
        let entries = vec![
            Ok(StoreEntry::file("/big/a", u64::MAX)),
            Ok(StoreEntry::file("/big/b", 1)),
        ];
        let err = total_file_size(entries).unwrap_err();
        assert!(err.is_precondition());
    }
}
