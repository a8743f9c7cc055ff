//! `ydmon watch` — stream status changes until Ctrl-C.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use ydmon_engine::{Monitor, Snapshot};

/// Arguments for `ydmon watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Emit one JSON object per change.
    #[arg(long)]
    pub json: bool,

    /// Start the daemon first if it is not running.
    #[arg(long)]
    pub start: bool,
}

#[derive(Serialize)]
struct ChangeEvent<'a> {
    at: DateTime<Local>,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

impl WatchArgs {
    pub fn run(self, config: &Path) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;
        runtime.block_on(self.watch(config))
    }

    async fn watch(self, config: &Path) -> Result<()> {
        let (mut monitor, mut changes) = Monitor::new(config)
            .with_context(|| format!("cannot monitor daemon configured in {}", config.display()))?;
        tracing::info!(path = %monitor.sync_dir().display(), "monitoring daemon");

        if self.start {
            tokio::task::block_in_place(|| monitor.start()).context("failed to start daemon")?;
        }

        let interrupted = tokio::signal::ctrl_c();
        tokio::pin!(interrupted);
        loop {
            tokio::select! {
                change = changes.recv() => {
                    let Some(snapshot) = change else {
                        tracing::warn!("monitor stopped unexpectedly");
                        break;
                    };
                    self.print(&snapshot)?;
                }
                signal = &mut interrupted => {
                    signal.context("ctrl-c handler failed")?;
                    tracing::info!("received ctrl-c, shutting down");
                    break;
                }
            }
        }

        monitor.close().await;
        Ok(())
    }

    fn print(&self, snapshot: &Snapshot) -> Result<()> {
        let event = ChangeEvent {
            at: Local::now(),
            snapshot,
        };
        if self.json {
            println!(
                "{}",
                serde_json::to_string(&event).context("failed to render change JSON")?
            );
        } else {
            print!("{}", render_text(&event));
        }
        Ok(())
    }
}

fn render_text(event: &ChangeEvent<'_>) -> String {
    let snapshot = event.snapshot;
    let mut out = format!(
        "{} {} -> {}\n",
        event.at.format("%H:%M:%S"),
        snapshot.previous_status.dimmed(),
        paint_status(&snapshot.status),
    );
    if !snapshot.total_space.is_empty() {
        out.push_str(&format!(
            "  used {} of {}, free {}, trash {}\n",
            snapshot.used_space, snapshot.total_space, snapshot.free_space, snapshot.trash_size
        ));
    }
    if !snapshot.progress.is_empty() {
        out.push_str(&format!("  progress {}\n", snapshot.progress));
    }
    if !snapshot.error_message.is_empty() {
        out.push_str(&format!(
            "  {} {} {}\n",
            "error".red().bold(),
            snapshot.error_message,
            snapshot.error_path
        ));
    }
    if snapshot.recent_items_changed {
        for item in &snapshot.recent_items {
            out.push_str(&format!("  synced {item}\n"));
        }
    }
    out
}

fn paint_status(status: &str) -> ColoredString {
    match status {
        "idle" => status.green(),
        "busy" | "index" => status.cyan(),
        "paused" => status.yellow(),
        "error" | "no_net" => status.red(),
        _ => status.normal(),
    }
}
