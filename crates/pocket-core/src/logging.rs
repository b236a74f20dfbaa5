//! Logging infrastructure for the Pocket AI client.
//!
//! Structured logging on the `tracing` ecosystem:
//!
//! - JSON lines written to `~/.pocket/logs/pocket.log` (daily rolling)
//! - Optional human-readable console layer on stderr
//! - `-v` raises the default level from INFO to DEBUG
//!
//! The terminal shell owns stdout/stderr while it runs, so the binary turns
//! the console layer off for TUI sessions.
//!
//! ## Example
//!
//! ```no_run
//! use pocket_core::logging;
//!
//! let _guard = logging::init_logging(None, false, false).expect("logging init");
//! tracing::info!("pocket started");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::error::{PocketError, Result};

/// Name of the rolling log file.
pub const LOG_FILE_NAME: &str = "pocket.log";

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system.
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.pocket/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
/// * `console` - If true, also writes compact human-readable logs to stderr.
///
/// `RUST_LOG` overrides the computed filter when set.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool, console: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| PocketError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    let console_layer = console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_file(verbose)
            .with_line_number(verbose)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| PocketError::internal(format!("logging already initialized: {e}")))?;

    tracing::debug!(log_dir = %log_dir.display(), verbose, console, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Filter directive used when `RUST_LOG` is unset.
///
/// Covers the binary and every `pocket_*` crate.
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("pocket={level},pocket_core={level},pocket_client={level},pocket_tui={level}")
}

/// Returns `~/.pocket`.
pub fn pocket_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".pocket"))
        .ok_or(PocketError::HomeNotFound)
}

/// Returns `~/.pocket/logs/`.
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(pocket_home()?.join("logs"))
}
