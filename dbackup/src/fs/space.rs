//! Destination free-space check.
//!
//! All size arithmetic is checked: an overflow or a negative quantity is a
//! precondition violation, never a wrapped value.

use super::store::FileStore;
use super::walker::total_file_size;
use crate::utils::{BackupError, Result};
use std::path::Path;

/// Free space required beyond the source size unless configured otherwise.
pub const DEFAULT_BUFFER_MIB: i64 = 300;

const KIB: u64 = 1024;

fn scale(value: i64, factor: u64, unit: &str) -> Result<u64> {
    let value = u64::try_from(value).map_err(|_| {
        BackupError::Precondition(format!("{unit}({value}): size must not be negative"))
    })?;
    value
        .checked_mul(factor)
        .ok_or_else(|| BackupError::Precondition(format!("{unit}({value}) overflows u64")))
}

/// `value` kibibytes in bytes.
pub fn kb(value: i64) -> Result<u64> {
    scale(value, KIB, "kb")
}

/// `value` mebibytes in bytes.
pub fn mb(value: i64) -> Result<u64> {
    scale(value, KIB * KIB, "mb")
}

/// `value` gibibytes in bytes.
pub fn gb(value: i64) -> Result<u64> {
    scale(value, KIB * KIB * KIB, "gb")
}

/// Required and available bytes for one backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBudget {
    /// Bytes free at the destination
    pub available: u64,

    /// Source size plus buffer
    pub required: u64,
}

impl SizeBudget {
    pub fn is_sufficient(&self) -> bool {
        self.available > self.required
    }
}

/// Measure the source tree and the destination filesystem.
///
/// `buffer` is the margin in bytes that must stay free on top of the
/// source size.
pub fn size_budget(
    store: &dyn FileStore,
    source: &Path,
    destination: &Path,
    buffer: i64,
) -> Result<SizeBudget> {
    let buffer = u64::try_from(buffer).map_err(|_| {
        BackupError::Precondition(format!("disk space buffer must not be negative, got {buffer}"))
    })?;

    let source_size = total_file_size(store.list_recursive(source))?;
    let required = source_size.checked_add(buffer).ok_or_else(|| {
        BackupError::Precondition(format!(
            "source size {source_size} plus buffer {buffer} overflows u64"
        ))
    })?;
    let available = store.available_space(destination)?;

    tracing::debug!(
        "Disk space: {} bytes required ({} source + {} buffer), {} available at {}",
        required,
        source_size,
        buffer,
        available,
        destination.display()
    );

    Ok(SizeBudget {
        available,
        required,
    })
}

/// True when `destination` has room for everything under `source` plus the
/// default 300 MiB buffer.
pub fn enough_disk_space(store: &dyn FileStore, source: &Path, destination: &Path) -> Result<bool> {
    let buffer = i64::try_from(mb(DEFAULT_BUFFER_MIB)?)
        .map_err(|_| BackupError::Precondition("default buffer out of range".into()))?;
    enough_disk_space_with_buffer(store, source, destination, buffer)
}

/// Same as [`enough_disk_space`] with an explicit buffer in bytes.
pub fn enough_disk_space_with_buffer(
    store: &dyn FileStore,
    source: &Path,
    destination: &Path,
    buffer: i64,
) -> Result<bool> {
    Ok(size_budget(store, source, destination, buffer)?.is_sufficient())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::store::LocalStore;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_kb_bounds() {
        assert_eq!(kb(0).unwrap(), 0);
        assert_eq!(kb(1).unwrap(), 1024);
        assert!(kb(i64::MAX / 1024).is_ok());
        assert!(kb(i64::MAX).unwrap_err().is_precondition());
        assert!(kb(-1).unwrap_err().is_precondition());
    }

    #[test]
    fn test_mb_bounds() {
        assert_eq!(mb(0).unwrap(), 0);
        assert_eq!(mb(300).unwrap(), 300 * 1024 * 1024);
        assert!(mb(i64::MAX / (1024 * 1024)).is_ok());
        assert!(mb(i64::MAX).unwrap_err().is_precondition());
        assert!(mb(-5).unwrap_err().is_precondition());
    }

    #[test]
    fn test_gb_bounds() {
        assert_eq!(gb(0).unwrap(), 0);
        assert_eq!(gb(2).unwrap(), 2 * 1024 * 1024 * 1024);
        assert!(gb(i64::MAX / (1024 * 1024 * 1024)).is_ok());
        assert!(gb(i64::MAX).unwrap_err().is_precondition());
        assert!(gb(i64::MIN).unwrap_err().is_precondition());
    }

    #[test]
    fn test_enough_space_for_small_tree() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"abc").unwrap();

        let store = LocalStore::new();
        assert!(enough_disk_space(&store, temp_dir.path(), temp_dir.path())?);
        Ok(())
    }

    #[test]
    fn test_huge_buffer_is_not_enough() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new();

        // One exbibyte is more than any test machine has free.
        let huge = i64::try_from(gb(1024 * 1024 * 1024)?).unwrap();
        assert!(!enough_disk_space_with_buffer(&store, temp_dir.path(), temp_dir.path(), huge)?);
        Ok(())
    }

    #[test]
    fn test_negative_buffer_is_precondition() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new();

        let err = enough_disk_space_with_buffer(&store, temp_dir.path(), temp_dir.path(), -1)
            .unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_budget_reports_source_size() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        fs::write(temp_dir.path().join("sub/a.bin"), vec![0u8; 100]).unwrap();

        let store = LocalStore::new();
        let budget = size_budget(&store, temp_dir.path(), temp_dir.path(), 24)?;
        assert_eq!(budget.required, 124);
        Ok(())
    }
}
