//! The observed state of the sync daemon at one point in time.

use serde::{Deserialize, Serialize};

/// Status token reported when the daemon is not running (empty status output).
pub const STATUS_NONE: &str = "none";

/// Status token a fresh [`Snapshot`] starts with, before the first sample.
pub const STATUS_UNKNOWN: &str = "unknown";

/// Status tokens during which the daemon is actively transferring or indexing.
pub const BUSY_STATUSES: [&str; 2] = ["busy", "index"];

/// Full observed daemon state.
///
/// Capacity fields are kept verbatim as the daemon prints them (`"10 GB"`,
/// `"2.3 GB"`); the daemon localizes and rounds them, so no attempt is made to
/// interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: String,
    /// Value `status` held before the most recent update.
    pub previous_status: String,
    pub total_space: String,
    pub used_space: String,
    pub free_space: String,
    pub trash_size: String,
    /// "Last synchronized items", in the order the daemon lists them.
    pub recent_items: Vec<String>,
    /// Whether `recent_items` changed during the most recent update.
    pub recent_items_changed: bool,
    pub progress: String,
    pub error_message: String,
    pub error_path: String,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            status: STATUS_UNKNOWN.to_string(),
            previous_status: STATUS_UNKNOWN.to_string(),
            total_space: String::new(),
            used_space: String::new(),
            free_space: String::new(),
            trash_size: String::new(),
            recent_items: Vec::new(),
            recent_items_changed: false,
            progress: String::new(),
            error_message: String::new(),
            error_path: String::new(),
        }
    }

    /// `true` while the daemon is transferring or indexing.
    pub fn is_busy(&self) -> bool {
        BUSY_STATUSES.contains(&self.status.as_str())
    }

    /// `true` when the last sample found no running daemon.
    pub fn is_stopped(&self) -> bool {
        self.status == STATUS_NONE
    }

    /// Parse `text` and merge it into this snapshot.
    ///
    /// Returns `true` when any observable field changed. See
    /// [`crate::detect::apply`] for the merge rules.
    pub fn update(&mut self, text: &str) -> bool {
        crate::detect::apply(self, &crate::parser::parse(text))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}
