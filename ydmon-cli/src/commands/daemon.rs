//! `ydmon start` / `ydmon stop` — drive the daemon.

use std::path::Path;

use anyhow::{Context, Result};

use ydmon_core::check_daemon;
use ydmon_engine::{ensure_started, ensure_stopped, YandexDisk};

pub fn start(config: &Path) -> Result<()> {
    let daemon = daemon(config)?;
    if ensure_started(&daemon).context("failed to start daemon")? {
        println!("daemon started");
    } else {
        println!("daemon is already running");
    }
    Ok(())
}

pub fn stop(config: &Path) -> Result<()> {
    let daemon = daemon(config)?;
    if ensure_stopped(&daemon).context("failed to stop daemon")? {
        println!("daemon stopped");
    } else {
        println!("daemon is not running");
    }
    Ok(())
}

pub(crate) fn daemon(config: &Path) -> Result<YandexDisk> {
    let setup = check_daemon(config)
        .with_context(|| format!("daemon check failed for {}", config.display()))?;
    Ok(YandexDisk::from_setup(&setup))
}
