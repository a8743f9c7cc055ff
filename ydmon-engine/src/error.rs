use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the monitor engine and daemon command invocation.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("daemon setup error: {0}")]
    Setup(#[from] ydmon_core::SetupError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("`{command}` failed: {detail}")]
    Command { command: String, detail: String },

    #[error("monitor must be created inside a tokio runtime")]
    NoRuntime,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> MonitorError {
    MonitorError::Io {
        path: path.into(),
        source,
    }
}
