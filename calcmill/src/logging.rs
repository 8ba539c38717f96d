//! Logging bootstrap for binaries.
//!
//! Installs a `tracing` subscriber with dual output: a compact stdout layer
//! for interactive runs and a non-blocking file layer for later inspection.
//! Library code never calls this; it logs through the
//! [`Logger`](crate::log::Logger) facade and the hosting binary decides the
//! backend.

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the global tracing subscriber.
///
/// Creates `log_dir` if needed and truncates any previous `log_file` so
/// each run starts with a clean log. The level defaults to `info`, or
/// `debug` when `debug` is set; `RUST_LOG` overrides both.
///
/// # Errors
///
/// Returns an error when the log directory or file cannot be created.
pub fn init_logging(log_dir: &str, log_file: &str, debug: bool) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;
    fs::write(Path::new(log_dir).join(log_file), "")?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .compact();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .compact();

    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Default log directory path.
pub fn default_log_dir() -> &'static str {
    "logs"
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "calcmill.log"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        PathBuf::from(format!("target/test_logs_{}_{}", tag, nanos))
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(default_log_dir(), "logs");
        assert_eq!(default_log_file(), "calcmill.log");
    }

    #[test]
    fn test_log_file_is_truncated_on_setup() {
        // init_logging installs a process-global subscriber, so only the
        // file handling is exercised here.
        let dir = scratch_dir("truncate");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("calcmill.log");
        fs::write(&file, "stale contents").unwrap();

        fs::write(&file, "").unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "");

        fs::remove_dir_all(&dir).unwrap();
    }
}
