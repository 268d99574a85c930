//! Logging setup.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("log file path has no file name: {0}")]
    FilePath(PathBuf),

    #[error("failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the background log file writer alive. Dropping it flushes.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Setup logging with the given level.
///
/// `RUST_LOG` takes precedence over `level`. Logs go to stderr, pretty or
/// JSON, and additionally to a daily rolling `file` when given.
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> Result<LogGuard, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().pretty().with_writer(std::io::stderr).boxed());
    }

    let mut guard = None;
    if let Some(path) = file {
        let (dir, prefix) = split_log_path(path)?;
        let appender = tracing_appender::rolling::daily(dir, prefix);
        let (writer, worker) = tracing_appender::non_blocking(appender);
        guard = Some(worker);

        let layer = fmt::layer().with_ansi(false).with_writer(writer);
        if json {
            layers.push(layer.json().boxed());
        } else {
            layers.push(layer.boxed());
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(LogGuard { _file: guard })
}

/// Directory and file-name prefix for the rolling appender.
fn split_log_path(path: &Path) -> Result<(PathBuf, OsString), LoggingError> {
    let prefix = path
        .file_name()
        .ok_or_else(|| LoggingError::FilePath(path.to_path_buf()))?
        .to_os_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, prefix))
}
