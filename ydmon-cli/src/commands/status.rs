//! `ydmon status` and `ydmon show` — one-off status queries.

use std::path::Path;

use anyhow::{Context, Result};

use ydmon_engine::{Daemon, Locale, Snapshot};

/// Print the daemon's report verbatim, in the user's language.
pub fn print_output(config: &Path) -> Result<()> {
    let daemon = super::daemon::daemon(config)?;
    let output = daemon.status(Locale::User);
    if output.is_empty() {
        println!("daemon is not running");
    } else {
        print!("{output}");
    }
    Ok(())
}

/// Print the parsed snapshot of a single sample.
pub fn print_snapshot(config: &Path) -> Result<()> {
    let daemon = super::daemon::daemon(config)?;
    let mut snapshot = Snapshot::new();
    snapshot.update(&daemon.status(Locale::Neutral));
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("failed to render snapshot JSON")?
    );
    Ok(())
}
