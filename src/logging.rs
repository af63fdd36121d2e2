// Tracing setup. The terminal belongs to the player view while a session runs,
// so everything goes to <data_dir>/vbs/vbs.log instead.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE: &str = "vbs.log";

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vbs")
}

/// Crate-level filter applied on top of `RUST_LOG`.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "vbs=debug"
    } else {
        "vbs=info"
    }
}

/// Install the global subscriber writing to the default log directory.
/// Hold on to the returned guard until exit; dropping it flushes and closes
/// the log file.
pub fn init(verbose: bool) -> anyhow::Result<WorkerGuard> {
    init_in(&log_dir(), verbose)
}

/// Same as [`init`], logging to `dir/vbs.log`.
pub fn init_in(dir: &Path, verbose: bool) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::from_default_env().add_directive(default_directive(verbose).parse()?);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(false))
        .with(filter)
        .try_init()
        .context("could not install log subscriber")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), debug = verbose, "vbs starting");
    Ok(guard)
}
