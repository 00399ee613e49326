//! Configuration management for dbackup.
//!
//! Loads configuration from an optional TOML file; every field falls back to
//! a default so a partial file is enough.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Patterns written by `--init` when no config overrides them.
pub const DEFAULT_PATTERNS: &[&str] = &[
    "/build", "/.dub", "/.git", "*.a", "*.dll", "*.dylib", "*.exe", "*.lib", "*.o", "*.obj",
    "*.so",
];

/// Name of the per-source ignore file.
pub const IGNORE_FILE_NAME: &str = ".dbackupignore";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub space: SpaceConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// Ignore file looked up in every source root
    #[serde(default = "default_ignore_file_name")]
    pub file_name: String,

    /// Content written by `--init`
    #[serde(default = "default_patterns")]
    pub default_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceConfig {
    /// Free space required beyond the source size, in MiB
    #[serde(default = "default_buffer_mib")]
    pub buffer_mib: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Deflate level (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_ignore_file_name() -> String {
    IGNORE_FILE_NAME.to_string()
}

fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_buffer_mib() -> i64 {
    300
}

fn default_compression_level() -> u32 {
    6
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            file_name: default_ignore_file_name(),
            default_patterns: default_patterns(),
        }
    }
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            buffer_mib: default_buffer_mib(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ignore: IgnoreConfig::default(),
            space: SpaceConfig::default(),
            archive: ArchiveConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.ignore.file_name.is_empty() || self.ignore.file_name.contains(['/', '\\']) {
            anyhow::bail!(
                "ignore.file_name must be a plain file name, got {:?}",
                self.ignore.file_name
            );
        }
        if self.archive.compression_level > 9 {
            anyhow::bail!(
                "archive.compression_level must be between 0 and 9, got {}",
                self.archive.compression_level
            );
        }
        Ok(())
    }
}
