pub mod daemon;
pub mod status;
pub mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ydmon_core::setup::default_config_path;

/// `--config` if given, otherwise the daemon's default config location.
pub fn resolve_config(config: Option<PathBuf>) -> Result<PathBuf> {
    match config {
        Some(path) => Ok(path),
        None => default_config_path().context("could not locate the daemon config file"),
    }
}
