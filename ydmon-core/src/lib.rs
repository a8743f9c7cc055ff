//! ydmon core library — status snapshot model, status parser, change
//! detection and daemon installation discovery.
//!
//! Public API surface:
//! - [`snapshot`] — [`Snapshot`], the observed daemon state
//! - [`parser`] — text of `yandex-disk status` → [`Sample`]
//! - [`detect`] — merge a [`Sample`] into a [`Snapshot`] and report changes
//! - [`setup`] — locate the daemon executable and validate its config file
//! - [`error`] — [`SetupError`]

pub mod detect;
pub mod error;
pub mod parser;
pub mod setup;
pub mod snapshot;

pub use error::SetupError;
pub use parser::{parse, Sample, StatusKey, StatusReport};
pub use setup::{check_daemon, check_daemon_at, DaemonConfig, DaemonSetup};
pub use snapshot::Snapshot;
