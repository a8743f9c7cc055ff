//! Best-effort watch on the daemon's activity log.
//!
//! The log only exists once the daemon has run in the synchronized folder, so
//! attaching can fail at construction and succeed after a later start.
//! Attaching is sticky: after the first success further attempts do nothing.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::MonitorError;

/// Raw notify events, including errors from the watcher backend.
pub type WatchEvents = mpsc::UnboundedReceiver<notify::Result<Event>>;

enum WatchState {
    Inactive(RecommendedWatcher),
    Active(RecommendedWatcher),
    Released,
}

pub struct ActivityWatch {
    path: PathBuf,
    state: Mutex<WatchState>,
}

impl ActivityWatch {
    /// Create an inactive watch for `path`; events arrive on the returned receiver.
    pub fn new(path: impl Into<PathBuf>) -> Result<(Self, WatchEvents), MonitorError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let watcher = recommended_watcher(move |event| {
            let _ = event_tx.send(event);
        })?;
        let watch = Self {
            path: path.into(),
            state: Mutex::new(WatchState::Inactive(watcher)),
        };
        Ok((watch, event_rx))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to attach to the log. Returns whether the watch is active afterwards.
    pub fn activate(&self) -> bool {
        let mut state = self.lock();
        if let WatchState::Inactive(watcher) = &mut *state {
            if let Err(err) = watcher.watch(&self.path, RecursiveMode::NonRecursive) {
                tracing::debug!(path = %self.path.display(), error = %err, "watch path error");
                return false;
            }
            if let WatchState::Inactive(watcher) = std::mem::replace(&mut *state, WatchState::Released) {
                *state = WatchState::Active(watcher);
            }
            tracing::debug!(path = %self.path.display(), "watch path added");
        }
        matches!(*state, WatchState::Active(_))
    }

    pub fn is_active(&self) -> bool {
        matches!(*self.lock(), WatchState::Active(_))
    }

    /// Drop the underlying watcher. Later activation attempts are no-ops.
    pub fn release(&self) {
        *self.lock() = WatchState::Released;
    }

    fn lock(&self) -> MutexGuard<'_, WatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ActivityWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match *self.lock() {
            WatchState::Inactive(_) => "inactive",
            WatchState::Active(_) => "active",
            WatchState::Released => "released",
        };
        f.debug_struct("ActivityWatch")
            .field("path", &self.path)
            .field("state", &state)
            .finish()
    }
}
