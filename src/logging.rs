//! Tracing subscriber setup.
//!
//! The dashboard owns the terminal, so it logs to a daily rolling file only.
//! One-shot CLI commands log warnings and errors to stderr.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{self, LoggingConfig};

const LOG_FILE: &str = "tradedesk.log";

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},tradedesk=debug")))
}

/// `TRADEDESK_LOG_DIR`, then `logging.dir`, then `<data_dir>/logs`
pub fn log_dir(settings: &LoggingConfig) -> PathBuf {
    std::env::var_os("TRADEDESK_LOG_DIR")
        .map(PathBuf::from)
        .or_else(|| settings.dir.clone())
        .or_else(|| config::data_dir().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the file subscriber used while the dashboard is on screen.
///
/// Returns `None` (and installs nothing) when the log directory cannot be
/// written; the guard must be held until shutdown to flush buffered lines.
pub fn init_file_logging(settings: &LoggingConfig) -> Option<WorkerGuard> {
    let dir = log_dir(settings);

    if std::fs::create_dir_all(&dir).is_err() {
        eprintln!(
            "Warning: Could not create log directory {}, file logging disabled",
            dir.display()
        );
        return None;
    }

    let probe = dir.join(".write_test");
    if let Err(e) = std::fs::write(&probe, b"") {
        eprintln!(
            "Warning: Could not write to log directory {} ({}), file logging disabled",
            dir.display(),
            e
        );
        return None;
    }
    let _ = std::fs::remove_file(&probe);

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = default_filter(&settings.level);

    let result = if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer).with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };

    match result {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

/// Minimal stderr logging for one-shot commands
pub fn init_console_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .try_init();
}
