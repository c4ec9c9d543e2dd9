//! Logging setup for host applications embedding the SDK.
//!
//! Optional: hosts with their own `tracing` subscriber can skip this
//! module entirely. [`init_logging`] wires a compact stdout layer plus a
//! non-blocking file writer, filtered through `RUST_LOG` (default
//! `info`). The log file is truncated at session start so each run reads
//! from the top.

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes and closes the file writer, so hold it for
/// the lifetime of the application.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initializes the global subscriber with file and stdout output.
///
/// May only be called once per process; a second call fails because the
/// global subscriber is already set.
///
/// # Arguments
///
/// * `log_dir` - Directory for log files, created if missing
/// * `log_file` - Log filename within `log_dir`
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the previous
/// log file cannot be truncated.
pub fn init_logging(log_dir: &str, log_file: &str) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    // Truncate rather than append so a session's log stands alone.
    let log_path = Path::new(log_dir).join(log_file);
    fs::write(&log_path, "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .compact();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
