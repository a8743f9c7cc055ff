//! Error types for ydmon-core.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while locating and validating the daemon installation.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The daemon executable could not be found on `PATH`.
    #[error("Yandex.Disk CLI utility `{exe}` is not installed. Install it first.")]
    NotInstalled { exe: String },

    /// Underlying I/O failure while reading the daemon configuration file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is readable but does not describe a usable setup.
    #[error("daemon is not configured ({reason}); first run `yandex-disk setup`")]
    NotConfigured { config: PathBuf, reason: String },

    /// `dirs::home_dir()` returned `None`, so the default config path is unknown.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,
}

/// Convenience constructor for [`SetupError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SetupError {
    SetupError::Io {
        path: path.into(),
        source,
    }
}
