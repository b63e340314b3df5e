//! Tracing setup.
//!
//! The TUI owns the terminal, so interactive runs log to a file in the temp
//! directory. CLI runs log to stderr.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log file {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to install logger: {0}")]
    Init(String),
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// A fresh `dogmatui-<random>.log` path in the temp directory.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("dogmatui-{:08x}.log", rand::random::<u32>()))
}

/// `RUST_LOG` if set, otherwise `default_level`.
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global subscriber. Returns the log file path, if any.
pub fn init(target: &LogTarget, default_level: &str) -> Result<Option<PathBuf>, LoggingError> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter(default_level))
                .try_init()
                .map_err(|e| LoggingError::Init(e.to_string()))?;
            Ok(None)
        }
        LogTarget::File(path) => {
            let file = create(path)?;
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(filter(default_level))
                .try_init()
                .map_err(|e| LoggingError::Init(e.to_string()))?;
            Ok(Some(path.clone()))
        }
    }
}

fn create(path: &Path) -> Result<File, LoggingError> {
    File::create(path).map_err(|source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    })
}
