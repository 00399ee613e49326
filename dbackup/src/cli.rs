//! Command-line surface.
//!
//! `--init`, `--from` and `--to` may each repeat and are executed in the
//! order they appear: `--to` backs up whatever `--from` most recently set.

use crate::command::BackupCommand;
use crate::executor::BackupReport;
use crate::utils::format::{format_bytes, format_elapsed};
use crate::utils::Result;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about = "Snapshot a directory into a dated ZIP archive", long_about = None)]
pub struct Args {
    /// Create a default ignore file in PATH
    #[arg(long, value_name = "PATH")]
    pub init: Vec<PathBuf>,

    /// Directory to back up (must come before --to)
    #[arg(long, value_name = "PATH")]
    pub from: Vec<PathBuf>,

    /// Directory to write the archive to; runs the backup immediately
    #[arg(long, value_name = "PATH")]
    pub to: Vec<PathBuf>,

    /// Print diagnostic output
    #[arg(short, long)]
    pub verbose: bool,

    /// Dry run: report what would be archived without writing (implies --verbose)
    #[arg(short, long)]
    pub annotate: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn verbose(&self) -> bool {
        self.verbose || self.annotate
    }
}

/// One path-taking flag, in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Init(PathBuf),
    From(PathBuf),
    To(PathBuf),
}

/// Parsed arguments plus the ordered actions they describe.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Args,
    pub actions: Vec<Action>,
}

impl Invocation {
    /// Parse the process arguments, exiting with clap's message on error.
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_from<I, T>(itr: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Args::command().try_get_matches_from(itr)?;
        let args = Args::from_arg_matches(&matches)?;
        let actions = ordered_actions(&matches);
        Ok(Self { args, actions })
    }
}

fn ordered_actions(matches: &ArgMatches) -> Vec<Action> {
    let kinds: [(&str, fn(PathBuf) -> Action); 3] =
        [("init", Action::Init), ("from", Action::From), ("to", Action::To)];
    let mut indexed = Vec::new();

    for (id, make) in kinds {
        if let (Some(values), Some(indices)) = (matches.get_many::<PathBuf>(id), matches.indices_of(id)) {
            for (index, value) in indices.zip(values) {
                indexed.push((index, make(value.clone())));
            }
        }
    }

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, action)| action).collect()
}

/// Tally of one invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

fn log_report(report: &BackupReport) {
    match &report.archive {
        Some(archive) => info!(
            "Wrote {} ({} files, {} -> {}) in {}",
            report.destination.display(),
            archive.members,
            format_bytes(report.total_bytes),
            format_bytes(archive.archive_bytes),
            format_elapsed(report.duration)
        ),
        None => info!(
            "Would write {} ({} files, {})",
            report.destination.display(),
            report.files.len(),
            format_bytes(report.total_bytes)
        ),
    }
}

/// Execute `actions` in order.
///
/// Operational failures are reported and counted, and later actions still
/// run. A precondition violation stops everything and is returned.
pub fn run(actions: &[Action], command: &mut BackupCommand<'_>) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for action in actions {
        let result = match action {
            Action::Init(dir) => command
                .init(dir)
                .map(|path| info!("Initialized {}", path.display())),
            Action::From(dir) => command.set_from(dir),
            Action::To(dir) => command.backup_to(dir).map(|report| log_report(&report)),
        };

        match result {
            Ok(()) => summary.succeeded += 1,
            Err(e) if e.is_precondition() => return Err(e),
            Err(e) => {
                error!("{}", e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
