//! ZIP assembly and commit.
//!
//! The whole archive is built in memory and handed to the store in a single
//! write, so a failure at any point leaves no archive behind.

use super::plan::BackupPlan;
use crate::fs::FileStore;
use crate::utils::{BackupError, Result};
use chrono::{Datelike, Local, Timelike};
use std::io::{Cursor, Write};
use std::time::SystemTime;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used unless configured otherwise.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Outcome of a committed archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub members: usize,
    pub uncompressed_bytes: u64,
    pub archive_bytes: u64,
    pub replaced_existing: bool,
}

/// ZIP timestamp for a file modification time; None before 1980 or after 2107.
fn zip_timestamp(modified: SystemTime) -> Option<zip::DateTime> {
    let local: chrono::DateTime<Local> = modified.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        local.month() as u8,
        local.day() as u8,
        local.hour() as u8,
        local.minute() as u8,
        local.second() as u8,
    )
    .ok()
}

pub struct ArchiveWriter<'a> {
    store: &'a dyn FileStore,
    compression_level: u32,
}

impl<'a> ArchiveWriter<'a> {
    pub fn new(store: &'a dyn FileStore) -> Self {
        Self {
            store,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    fn member_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(self.compression_level)))
    }

    /// Compress every planned file into an in-memory ZIP.
    ///
    /// Any unreadable file aborts the build; nothing is skipped silently.
    pub fn build(&self, plan: &BackupPlan) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in plan.files() {
            let content = self.store.read_all(&entry.path)?;
            let mut options = self.member_options();
            if let Some(timestamp) = zip_timestamp(self.store.last_modified(&entry.path)?) {
                options = options.last_modified_time(timestamp);
            }

            zip.start_file(entry.member_name.as_str(), options)?;
            zip.write_all(&content)
                .map_err(|e| BackupError::io(&entry.path, e))?;

            debug!("Added {} ({} bytes)", entry.member_name, content.len());
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Build the archive and replace `plan.destination` with it.
    pub fn write(&self, plan: &BackupPlan) -> Result<ArchiveSummary> {
        let bytes = self.build(plan)?;
        let replaced_existing = self.store.exists(&plan.destination);
        if replaced_existing {
            info!("Replacing existing archive {}", plan.destination.display());
        }

        self.store.write_all(&plan.destination, &bytes)?;

        Ok(ArchiveSummary {
            members: plan.file_count(),
            uncompressed_bytes: plan.total_bytes()?,
            archive_bytes: bytes.len() as u64,
            replaced_existing,
        })
    }
}
