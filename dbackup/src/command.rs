//! The command aggregate driven by `--init`, `--from` and `--to`.
//!
//! The source directory is only ever set through [`BackupCommand::set_from`],
//! so it is always either unset or an existing directory.

use crate::config::Config;
use crate::executor::{BackupExecutor, BackupJob, BackupReport};
use crate::fs::space::mb;
use crate::fs::FileStore;
use crate::ignore::init_ignore_file;
use crate::naming::absolute_normalized;
use crate::utils::{BackupError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Settings shared by every backup of one invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub annotate: bool,
    pub buffer_bytes: i64,
    pub ignore_file_name: String,
    pub default_patterns: Vec<String>,
    pub compression_level: u32,
}

impl RunOptions {
    /// Derive options from the configuration; a negative or oversized
    /// buffer is a precondition violation.
    pub fn from_config(config: &Config, annotate: bool) -> Result<Self> {
        let buffer = mb(config.space.buffer_mib)?;
        let buffer_bytes = i64::try_from(buffer).map_err(|_| {
            BackupError::Precondition(format!(
                "space.buffer_mib = {} does not fit in a signed byte count",
                config.space.buffer_mib
            ))
        })?;

        Ok(Self {
            annotate,
            buffer_bytes,
            ignore_file_name: config.ignore.file_name.clone(),
            default_patterns: config.ignore.default_patterns.clone(),
            compression_level: config.archive.compression_level,
        })
    }
}

/// Validate that `path` names an existing directory; returns its absolute form.
pub fn validate_directory(store: &dyn FileStore, path: &Path) -> Result<PathBuf> {
    if !store.exists(path) {
        return Err(BackupError::NotFound(path.to_path_buf()));
    }
    if !store.is_dir(path) {
        return Err(BackupError::NotADirectory(path.to_path_buf()));
    }
    absolute_normalized(path)
}

pub struct BackupCommand<'a> {
    store: &'a dyn FileStore,
    options: RunOptions,
    from: Option<PathBuf>,
}

impl<'a> BackupCommand<'a> {
    pub fn new(store: &'a dyn FileStore, options: RunOptions) -> Self {
        Self {
            store,
            options,
            from: None,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.from.as_deref()
    }

    /// Set the source root. On failure the previous source is cleared, so a
    /// following `--to` cannot silently back up an older `--from`.
    pub fn set_from(&mut self, path: &Path) -> Result<()> {
        self.from = None;
        let dir = validate_directory(self.store, path)?;
        info!("Source directory: {}", dir.display());
        self.from = Some(dir);
        Ok(())
    }

    /// Create the default ignore file in `dir`.
    pub fn init(&self, dir: &Path) -> Result<PathBuf> {
        init_ignore_file(
            self.store,
            dir,
            &self.options.ignore_file_name,
            &self.options.default_patterns,
        )
    }

    /// Validate `to` and back up the current source into it.
    pub fn backup_to(&self, to: &Path) -> Result<BackupReport> {
        let destination_dir = validate_directory(self.store, to)?;
        let source = self.from.clone().ok_or(BackupError::MissingSource)?;

        let job = BackupJob {
            source,
            destination_dir,
            annotate: self.options.annotate,
            buffer_bytes: self.options.buffer_bytes,
            ignore_file_name: self.options.ignore_file_name.clone(),
            compression_level: self.options.compression_level,
        };

        BackupExecutor::new(self.store).execute(&job)
    }
}
