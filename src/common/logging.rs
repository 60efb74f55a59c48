//! Logging and tracing configuration
//!
//! Logs go to stderr so that the colourised summary on stdout stays readable.
//! An optional log file receives the same events without ANSI colours.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::{Error, Result};

/// Initialize tracing for the CLI
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate (DEBUG with `verbose`), WARN for
/// dependencies. The returned guard must be held until exit so the file
/// writer flushes.
pub fn init_cli(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("metrics_e2e=debug,warn")
        } else {
            EnvFilter::new("metrics_e2e=info,warn")
        }
    });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return Ok(None);
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::FileWrite {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritable_log_file_is_a_write_error() {
        // Fails while opening the file, before any subscriber is installed
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("run.log");

        let err = init_cli(false, Some(&path)).unwrap_err();

        assert!(matches!(err, Error::FileWrite { .. }));
        assert!(err.to_string().contains("for writing"));
    }
}
