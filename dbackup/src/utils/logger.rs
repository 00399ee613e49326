//! Logging configuration using tracing.

use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when `--verbose` or `--annotate` is given.
pub const VERBOSE_LEVEL: &str = "info";

/// Pick the filter level: an explicit override wins, verbose raises the
/// configured level to at least `info`.
pub fn effective_level<'a>(override_level: Option<&'a str>, configured: &'a str, verbose: bool) -> &'a str {
    match override_level {
        Some(level) => level,
        None if verbose && matches!(configured, "error" | "warn") => VERBOSE_LEVEL,
        None => configured,
    }
}

/// Initialize logging with the specified level
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .without_time(),
        )
        .try_init()?;

    Ok(())
}
