//! Backup job executor - runs one snapshot from start to finish.
//!
//! A job moves through a fixed sequence of stages:
//!
//! ```text
//! Init -> CheckDiskSpace -> Plan -> Annotate | Write -> Done
//! ```
//!
//! There are no retries. The first failing stage aborts the job, and since
//! the archive is committed in one write at the very end, an aborted job
//! never leaves a partial archive.

pub mod archive;
pub mod plan;

use crate::fs::space::{size_budget, DEFAULT_BUFFER_MIB};
use crate::fs::FileStore;
use crate::ignore::{load_patterns, Matcher};
use crate::utils::format::{format_bytes, format_elapsed};
use crate::utils::{BackupError, Result};
use archive::{ArchiveSummary, ArchiveWriter, DEFAULT_COMPRESSION_LEVEL};
use plan::{ArchivePlanner, BackupPlan};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Stages of one backup, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStage {
    Init,
    CheckDiskSpace,
    Plan,
    Annotate,
    Write,
    Done,
}

impl fmt::Display for BackupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackupStage::Init => "init",
            BackupStage::CheckDiskSpace => "check-disk-space",
            BackupStage::Plan => "plan",
            BackupStage::Annotate => "annotate",
            BackupStage::Write => "write",
            BackupStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Backup job configuration
#[derive(Debug, Clone)]
pub struct BackupJob {
    pub source: PathBuf,
    pub destination_dir: PathBuf,
    /// Plan and report only; nothing is compressed or written
    pub annotate: bool,
    /// Free space required beyond the source size, in bytes
    pub buffer_bytes: i64,
    pub ignore_file_name: String,
    pub compression_level: u32,
}

impl BackupJob {
    pub fn new(source: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination_dir: destination_dir.into(),
            annotate: false,
            buffer_bytes: DEFAULT_BUFFER_MIB * 1024 * 1024,
            ignore_file_name: crate::config::IGNORE_FILE_NAME.to_string(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Backup execution result
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub destination: PathBuf,
    /// Member names of the archived (or, when annotating, archivable) files
    pub files: Vec<String>,
    pub total_bytes: u64,
    pub excluded: usize,
    /// None for annotate runs
    pub archive: Option<ArchiveSummary>,
    pub duration: Duration,
}

impl BackupReport {
    pub fn written(&self) -> bool {
        self.archive.is_some()
    }
}

fn require_directory(store: &dyn FileStore, path: &Path) -> Result<()> {
    if !store.exists(path) {
        return Err(BackupError::NotFound(path.to_path_buf()));
    }
    if !store.is_dir(path) {
        return Err(BackupError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Main backup executor
pub struct BackupExecutor<'a> {
    store: &'a dyn FileStore,
}

impl<'a> BackupExecutor<'a> {
    pub fn new(store: &'a dyn FileStore) -> Self {
        Self { store }
    }

    /// Execute a backup job
    pub fn execute(&self, job: &BackupJob) -> Result<BackupReport> {
        let start_time = Instant::now();

        enter(BackupStage::Init);
        require_directory(self.store, &job.source)?;
        require_directory(self.store, &job.destination_dir)?;

        enter(BackupStage::CheckDiskSpace);
        let budget = size_budget(self.store, &job.source, &job.destination_dir, job.buffer_bytes)?;
        if !budget.is_sufficient() {
            return Err(BackupError::InsufficientSpace {
                destination: job.destination_dir.clone(),
                required: budget.required,
                available: budget.available,
            });
        }

        enter(BackupStage::Plan);
        let matcher = Matcher::new(load_patterns(self.store, &job.source, &job.ignore_file_name)?);
        let plan = ArchivePlanner::new(self.store, &matcher).plan(&job.source, &job.destination_dir)?;
        let total_bytes = plan.total_bytes()?;

        let archive = if job.annotate {
            enter(BackupStage::Annotate);
            self.annotate(&plan, total_bytes);
            None
        } else {
            enter(BackupStage::Write);
            Some(self.write(&plan, job.compression_level, total_bytes)?)
        };

        enter(BackupStage::Done);
        let report = BackupReport {
            destination: plan.destination.clone(),
            files: plan.files().map(|e| e.member_name.clone()).collect(),
            total_bytes,
            excluded: plan.excluded,
            archive,
            duration: start_time.elapsed(),
        };

        Ok(report)
    }

    fn annotate(&self, plan: &BackupPlan, total_bytes: u64) {
        info!(
            "Annotating backup of {} to {} (nothing will be written)",
            plan.source_root.display(),
            plan.destination.display()
        );

        for entry in plan.files() {
            info!("  {} ({})", entry.member_name, format_bytes(entry.size));
        }

        info!(
            "Annotation finished: {} files, {} would be archived, {} entries excluded",
            plan.file_count(),
            format_bytes(total_bytes),
            plan.excluded
        );
    }

    fn write(&self, plan: &BackupPlan, compression_level: u32, total_bytes: u64) -> Result<ArchiveSummary> {
        let start_time = Instant::now();
        info!(
            "Backing up {} to {} ({} files, {})",
            plan.source_root.display(),
            plan.destination.display(),
            plan.file_count(),
            format_bytes(total_bytes)
        );

        for entry in plan.files() {
            info!("  {} ({})", entry.member_name, format_bytes(entry.size));
        }

        let summary = ArchiveWriter::new(self.store)
            .with_compression_level(compression_level)
            .write(plan)?;

        info!(
            "Backup finished: {} members, {} archive in {}",
            summary.members,
            format_bytes(summary.archive_bytes),
            format_elapsed(start_time.elapsed())
        );

        Ok(summary)
    }
}

fn enter(stage: BackupStage) {
    debug!("Backup stage: {}", stage);
}
