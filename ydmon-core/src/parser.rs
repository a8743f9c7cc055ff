//! Parser for the text printed by `yandex-disk status`.
//!
//! # Grammar
//!
//! ```text
//! Synchronization core status: busy
//! Sync progress: 65.34 MB/ 139.38 MB (46 %)
//! Path to Yandex.Disk directory: '/home/user/Yandex.Disk'
//!     Total: 43.50 GB
//!     Used: 2.89 GB
//!     Available: 40.61 GB
//!     Max file size: 50 GB
//!     Trash size: 0 B
//!
//! Last synchronized items:
//!     file: 'NewFile'
//!     file: 'File.ods'
//! ```
//!
//! The header is `key: value` lines, the optional trailing list starts at the
//! `Last synchronized items:` marker. The format belongs to the daemon, so the
//! parser never fails: unknown lines are ignored and malformed list lines are
//! skipped.

use std::collections::BTreeMap;

/// Line that separates the header from the recently synchronized items.
pub const RECENT_ITEMS_MARKER: &str = "Last synchronized items:";

/// Header keys the parser recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusKey {
    Status,
    Total,
    Used,
    Available,
    Trash,
    Progress,
    Error,
    ErrorPath,
}

impl StatusKey {
    pub const ALL: [StatusKey; 8] = [
        StatusKey::Status,
        StatusKey::Total,
        StatusKey::Used,
        StatusKey::Available,
        StatusKey::Trash,
        StatusKey::Progress,
        StatusKey::Error,
        StatusKey::ErrorPath,
    ];

    /// Keys that keep their previous value when a sample omits them.
    pub const STICKY: [StatusKey; 5] = [
        StatusKey::Status,
        StatusKey::Total,
        StatusKey::Used,
        StatusKey::Available,
        StatusKey::Trash,
    ];

    /// Keys that are reset to empty when a sample omits them.
    pub const RESET_ON_ABSENCE: [StatusKey; 3] =
        [StatusKey::Progress, StatusKey::Error, StatusKey::ErrorPath];

    /// The exact label the daemon prints for this key.
    pub fn label(self) -> &'static str {
        match self {
            StatusKey::Status => "Synchronization core status",
            StatusKey::Total => "Total",
            StatusKey::Used => "Used",
            StatusKey::Available => "Available",
            StatusKey::Trash => "Trash size",
            StatusKey::Progress => "Sync progress",
            StatusKey::Error => "Error",
            StatusKey::ErrorPath => "Path",
        }
    }

    /// Case- and whitespace-sensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.label() == label)
    }
}

/// One parsed status sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sample {
    /// The status query produced no output: the daemon is not running.
    NotRunning,
    Report(StatusReport),
}

/// Field values extracted from non-empty status text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    values: BTreeMap<StatusKey, String>,
    recent_items: Vec<String>,
}

impl StatusReport {
    /// Value for `key`, or `None` when a sticky key was absent from the text.
    ///
    /// Keys in [`StatusKey::RESET_ON_ABSENCE`] are always present.
    pub fn get(&self, key: StatusKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = (StatusKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn recent_items(&self) -> &[String] {
        &self.recent_items
    }
}

/// Parse the raw output of a status query.
pub fn parse(text: &str) -> Sample {
    if text.is_empty() {
        return Sample::NotRunning;
    }

    let (header, list) = match text.find(RECENT_ITEMS_MARKER) {
        Some(at) if at > 0 => (&text[..at], Some(&text[at + RECENT_ITEMS_MARKER.len()..])),
        _ => (text, None),
    };

    let mut values: BTreeMap<StatusKey, String> = StatusKey::RESET_ON_ABSENCE
        .into_iter()
        .map(|key| (key, String::new()))
        .collect();
    for (key, value) in header.lines().filter_map(parse_header_line) {
        values.insert(key, value);
    }

    let recent_items = list.map(parse_recent_items).unwrap_or_default();
    Sample::Report(StatusReport {
        values,
        recent_items,
    })
}

fn parse_header_line(line: &str) -> Option<(StatusKey, String)> {
    let colon = line.find(':').filter(|&at| at > 0)?;
    let key = StatusKey::from_label(line[..colon].trim())?;
    let rest = &line[colon + 1..];
    let value = rest.strip_prefix(' ').unwrap_or(rest);
    let value = match key {
        // The daemon quotes the error path.
        StatusKey::ErrorPath => strip_outer_chars(value),
        _ => value.to_string(),
    };
    Some((key, value))
}

fn strip_outer_chars(value: &str) -> String {
    let mut chars = value.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

fn parse_recent_items(list: &str) -> Vec<String> {
    list.lines()
        .filter(|line| !line.is_empty())
        .filter_map(parse_recent_item)
        .collect()
}

/// `\tfile: 'path'` → `path`: skips `: '` after the first colon and drops the
/// closing quote.
fn parse_recent_item(line: &str) -> Option<String> {
    let start = line.find(':')? + 3;
    let (end, _) = line.char_indices().next_back()?;
    if end < start {
        return None;
    }
    line.get(start..end).map(str::to_string)
}
