//! Status monitor engine: samples the `yandex-disk` daemon, detects changes
//! and publishes them on a single-slot channel.
//!
//! Sampling is driven by an adaptive poll timer and by a watch on the daemon's
//! activity log; see [`Monitor`] for the lifecycle.

pub mod daemon;
mod error;
pub mod paths;
mod runtime;
pub mod schedule;
pub mod watch;

pub use daemon::{ensure_started, ensure_stopped, Daemon, Locale, YandexDisk};
pub use error::MonitorError;
pub use runtime::{init_tracing, Changes, LogFormat, Monitor, MonitorOptions};
pub use ydmon_core::Snapshot;
