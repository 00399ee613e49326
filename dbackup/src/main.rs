//! dbackup - main entry point

use anyhow::Result;
use clap::CommandFactory;
use dbackup::cli::{self, Args, Invocation};
use dbackup::fs::LocalStore;
use dbackup::{utils, BackupCommand, Config, RunOptions};

fn main() -> Result<()> {
    let Invocation { args, actions } = Invocation::parse();

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Initialize logging
    let log_level = utils::logger::effective_level(args.log_level.as_deref(), &config.log.level, args.verbose());
    utils::logger::init(log_level)?;

    if actions.is_empty() {
        Args::command().print_help()?;
        return Ok(());
    }

    tracing::debug!("dbackup v{} running {} actions", env!("CARGO_PKG_VERSION"), actions.len());

    let store = LocalStore::new();
    let options = RunOptions::from_config(&config, args.annotate)?;
    let mut command = BackupCommand::new(&store, options);

    let summary = cli::run(&actions, &mut command)?;
    if summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
