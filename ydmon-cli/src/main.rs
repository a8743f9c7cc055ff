//! ydmon — status monitor for the Yandex.Disk sync daemon.
//!
//! # Usage
//!
//! ```text
//! ydmon [--config <path>] watch [--json] [--start]
//! ydmon [--config <path>] status
//! ydmon [--config <path>] show
//! ydmon [--config <path>] start|stop
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::watch::WatchArgs;
use ydmon_engine::{init_tracing, LogFormat};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ydmon",
    version,
    about = "Watch the Yandex.Disk sync daemon and report status changes",
    long_about = None,
)]
struct Cli {
    /// Daemon config file [default: ~/.config/yandex-disk/config.cfg].
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to stderr as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every daemon status change until interrupted.
    Watch(WatchArgs),

    /// Print the daemon's own status report.
    Status,

    /// Print one parsed status snapshot as JSON.
    Show,

    /// Start the daemon unless it is already running.
    Start,

    /// Stop the daemon unless it is already stopped.
    Stop,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let config = commands::resolve_config(cli.config)?;
    match cli.command {
        Commands::Watch(args) => args.run(&config),
        Commands::Status => commands::status::print_output(&config),
        Commands::Show => commands::status::print_snapshot(&config),
        Commands::Start => commands::daemon::start(&config),
        Commands::Stop => commands::daemon::stop(&config),
    }
}
