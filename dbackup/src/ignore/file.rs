//! Reading and creating the per-source ignore file.

use super::pattern::PatternSet;
use crate::fs::FileStore;
use crate::utils::{BackupError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load the ignore file of `source_root`. A missing file yields an empty set.
pub fn load_patterns(store: &dyn FileStore, source_root: &Path, file_name: &str) -> Result<PatternSet> {
    let path = source_root.join(file_name);

    if !store.is_file(&path) {
        debug!("No {} in {}, nothing is ignored", file_name, source_root.display());
        return Ok(PatternSet::new());
    }

    let bytes = store.read_all(&path)?;
    let patterns = PatternSet::parse(&String::from_utf8_lossy(&bytes));
    debug!("Loaded {} ignore patterns from {}", patterns.len(), path.display());

    Ok(patterns)
}

/// Create `dir/file_name` holding `patterns`, one per line.
///
/// Fails without touching the disk when `dir` is not an existing directory
/// or the ignore file is already there.
pub fn init_ignore_file(
    store: &dyn FileStore,
    dir: &Path,
    file_name: &str,
    patterns: &[String],
) -> Result<PathBuf> {
    if !store.exists(dir) {
        return Err(BackupError::NotFound(dir.to_path_buf()));
    }
    if !store.is_dir(dir) {
        return Err(BackupError::NotADirectory(dir.to_path_buf()));
    }

    let path = dir.join(file_name);
    if store.exists(&path) {
        return Err(BackupError::IgnoreFileExists(path));
    }

    let mut content = patterns.join("\n");
    content.push('\n');
    store.write_all(&path, content.as_bytes())?;

    info!("Created {} with {} patterns", path.display(), patterns.len());
    Ok(path)
}
