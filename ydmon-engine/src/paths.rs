use std::path::{Path, PathBuf};
use std::time::Duration;

/// Log the daemon appends to on every bit of activity, relative to the
/// synchronized folder.
pub const ACTIVITY_LOG: &str = ".sync/cli.log";

/// Delay before the first status sample after the monitor starts.
pub const FIRST_TICK: Duration = Duration::from_millis(100);

/// Length of one polling interval unit.
pub const TIME_UNIT: Duration = Duration::from_secs(1);

/// Polling interval, in units, while the daemon is busy.
pub const BUSY_INTERVAL: u32 = 2;

/// Polling stops being rescheduled once the interval reaches this many units.
pub const POLL_CEILING: u32 = 10;

pub fn activity_log_path(sync_dir: &Path) -> PathBuf {
    sync_dir.join(ACTIVITY_LOG)
}
