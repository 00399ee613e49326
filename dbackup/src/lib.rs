//! dbackup library
//!
//! Snapshots a directory into a dated ZIP archive, skipping whatever the
//! source's `.dbackupignore` names, after checking the destination has room.

pub mod cli;
pub mod command;
pub mod config;
pub mod executor;
pub mod fs;
pub mod ignore;
pub mod naming;
pub mod utils;

// Re-export commonly used types
pub use command::{BackupCommand, RunOptions};
pub use config::Config;
pub use executor::{BackupExecutor, BackupJob, BackupReport};
pub use utils::errors::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;
