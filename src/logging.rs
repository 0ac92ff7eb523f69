//! Developer diagnostics via `tracing`.
//!
//! The console owns stdout, so interactive runs log to a file; plain commands
//! log to stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub const LOG_FILTER_ENV: &str = "DEVSTACK_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
    Disabled,
}

impl LogTarget {
    /// Target for interactive sessions: the configured file, or nothing.
    pub fn for_console(config: &LoggingConfig) -> Self {
        match config.file.as_ref() {
            Some(path) if !path.as_os_str().is_empty() => LogTarget::File(path.clone()),
            _ => LogTarget::Disabled,
        }
    }

    /// Target for one-shot commands: stderr once a filter is requested
    /// explicitly, otherwise the same as the console.
    pub fn for_command(config: &LoggingConfig, filter_requested: bool) -> Self {
        if filter_requested {
            LogTarget::Stderr
        } else {
            Self::for_console(config)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log file `{path}`: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

pub fn init_logging(config: &LoggingConfig, target: LogTarget) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    match target {
        LogTarget::Disabled => return Ok(()),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|source| LoggingError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|error| LoggingError::Install(error.to_string()))?;
        }
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|error| LoggingError::Install(error.to_string()))?;
        }
    }

    tracing::debug!(level = %config.level, "logging initialized");
    Ok(())
}
