//! Change detection: merge a parsed [`Sample`] into a [`Snapshot`].
//!
//! Rules:
//! - `previous_status` always receives the pre-update status and never counts
//!   as a change.
//! - Sticky keys absent from a sample keep their value; reset keys arrive as
//!   empty strings from the parser and overwrite.
//! - `recent_items` is replaced wholesale when its length changes and patched
//!   element-wise otherwise. `recent_items_changed` is tracked on its own but
//!   also makes the update report a change.
//! - A not-running sample clears the snapshot only on the edge into `"none"`.

use crate::parser::{Sample, StatusKey};
use crate::snapshot::{Snapshot, STATUS_NONE};

/// Merge `sample` into `snapshot`. Returns `true` when anything observable changed.
pub fn apply(snapshot: &mut Snapshot, sample: &Sample) -> bool {
    snapshot.previous_status = snapshot.status.clone();

    let report = match sample {
        Sample::NotRunning => return apply_not_running(snapshot),
        Sample::Report(report) => report,
    };

    let mut changed = false;
    for (key, value) in report.values() {
        changed |= set_changed(field_mut(snapshot, key), value);
    }
    snapshot.recent_items_changed = apply_recent_items(snapshot, report.recent_items());

    changed || snapshot.recent_items_changed
}

fn apply_not_running(snapshot: &mut Snapshot) -> bool {
    if !set_changed(&mut snapshot.status, STATUS_NONE) {
        snapshot.recent_items_changed = false;
        return false;
    }
    for key in StatusKey::ALL {
        if key != StatusKey::Status {
            field_mut(snapshot, key).clear();
        }
    }
    snapshot.recent_items.clear();
    snapshot.recent_items_changed = true;
    true
}

fn apply_recent_items(snapshot: &mut Snapshot, items: &[String]) -> bool {
    if snapshot.recent_items.len() != items.len() {
        snapshot.recent_items = items.to_vec();
        return true;
    }
    let mut changed = false;
    for (slot, item) in snapshot.recent_items.iter_mut().zip(items) {
        changed |= set_changed(slot, item);
    }
    changed
}

fn field_mut(snapshot: &mut Snapshot, key: StatusKey) -> &mut String {
    match key {
        StatusKey::Status => &mut snapshot.status,
        StatusKey::Total => &mut snapshot.total_space,
        StatusKey::Used => &mut snapshot.used_space,
        StatusKey::Available => &mut snapshot.free_space,
        StatusKey::Trash => &mut snapshot.trash_size,
        StatusKey::Progress => &mut snapshot.progress,
        StatusKey::Error => &mut snapshot.error_message,
        StatusKey::ErrorPath => &mut snapshot.error_path,
    }
}

fn set_changed(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    value.clone_into(slot);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE_FULL: &str = "Synchronization core status: idle\n\
        Path to Yandex.Disk directory: '/home/user/Yandex.Disk'\n\
        \tTotal: 43.50 GB\n\
        \tUsed: 2.89 GB\n\
        \tAvailable: 40.61 GB\n\
        \tMax file size: 50 GB\n\
        \tTrash size: 0 B\n\
        \n\
        Last synchronized items:\n\
        \tfile: 'NewFile'\n\
        \tfile: 'File.ods'\n\
        \tfile: 'downloads/file.deb'\n";

    fn idle_with_items(items: &[&str]) -> String {
        let mut text = String::from("Synchronization core status: idle\nLast synchronized items:\n");
        for item in items {
            text.push_str(&format!("\tfile: '{item}'\n"));
        }
        text
    }

    #[test]
    fn full_report_populates_every_field() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.update(IDLE_FULL));
        assert_eq!(snapshot.status, "idle");
        assert_eq!(snapshot.previous_status, "unknown");
        assert_eq!(snapshot.total_space, "43.50 GB");
        assert_eq!(snapshot.used_space, "2.89 GB");
        assert_eq!(snapshot.free_space, "40.61 GB");
        assert_eq!(snapshot.trash_size, "0 B");
        assert_eq!(
            snapshot.recent_items,
            ["NewFile", "File.ods", "downloads/file.deb"]
        );
        assert!(snapshot.recent_items_changed);
    }

    #[test]
    fn identical_text_twice_is_unchanged() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.update(IDLE_FULL));
        assert!(!snapshot.update(IDLE_FULL));
        assert!(!snapshot.recent_items_changed);
        assert_eq!(snapshot.previous_status, "idle");
    }

    #[test]
    fn busy_to_idle_scenario() {
        let mut snapshot = Snapshot::new();
        snapshot.status = "busy".to_string();

        let changed = snapshot.update("Synchronization core status: idle\nTotal: 10 GB\n");

        assert!(changed);
        assert_eq!(snapshot.status, "idle");
        assert_eq!(snapshot.previous_status, "busy");
        assert_eq!(snapshot.total_space, "10 GB");
    }

    #[test]
    fn previous_status_moves_even_without_change() {
        let mut snapshot = Snapshot::new();
        snapshot.update("Synchronization core status: busy\n");
        snapshot.update("Synchronization core status: idle\n");
        assert_eq!(snapshot.previous_status, "busy");
        assert!(!snapshot.update("Synchronization core status: idle\n"));
        assert_eq!(snapshot.previous_status, "idle");
    }

    #[test]
    fn empty_text_clears_once_on_the_edge() {
        let mut snapshot = Snapshot::new();
        snapshot.update(IDLE_FULL);

        assert!(snapshot.update(""));
        assert_eq!(snapshot.status, "none");
        assert_eq!(snapshot.previous_status, "idle");
        assert!(snapshot.recent_items.is_empty());
        assert!(snapshot.recent_items_changed);
        assert!(snapshot.total_space.is_empty());
        assert!(snapshot.used_space.is_empty());
        assert!(snapshot.free_space.is_empty());
        assert!(snapshot.trash_size.is_empty());

        assert!(!snapshot.update(""));
        assert_eq!(snapshot.previous_status, "none");
        assert!(!snapshot.recent_items_changed);
    }

    #[test]
    fn first_sample_of_stopped_daemon_is_a_change() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.update(""));
        assert_eq!(snapshot.status, "none");
        assert_eq!(snapshot.previous_status, "unknown");
        assert!(snapshot.recent_items.is_empty());
        assert!(snapshot.recent_items_changed);
    }

    #[test]
    fn sticky_fields_survive_a_sparse_sample() {
        let mut snapshot = Snapshot::new();
        snapshot.update(IDLE_FULL);
        snapshot.update("Synchronization core status: busy\nSync progress: 1 MB/ 2 MB (50 %)\n");
        assert_eq!(snapshot.total_space, "43.50 GB");
        assert_eq!(snapshot.trash_size, "0 B");
        assert_eq!(snapshot.progress, "1 MB/ 2 MB (50 %)");
    }

    #[test]
    fn reset_fields_clear_when_absent() {
        let mut snapshot = Snapshot::new();
        snapshot.update(
            "Synchronization core status: error\nError: access error\nPath: 'a/b.txt'\nSync progress: 3 %\n",
        );
        assert_eq!(snapshot.error_message, "access error");
        assert_eq!(snapshot.error_path, "a/b.txt");

        assert!(snapshot.update("Synchronization core status: error\n"));
        assert!(snapshot.error_message.is_empty());
        assert!(snapshot.error_path.is_empty());
        assert!(snapshot.progress.is_empty());
        assert_eq!(snapshot.status, "error");
    }

    #[test]
    fn same_length_list_is_patched_in_place() {
        let mut snapshot = Snapshot::new();
        snapshot.update(&idle_with_items(&["a", "b", "c"]));

        let changed = snapshot.update(&idle_with_items(&["a", "x", "c"]));

        assert!(changed, "list change alone must report a change");
        assert!(snapshot.recent_items_changed);
        assert_eq!(snapshot.recent_items, ["a", "x", "c"]);
        assert_eq!(snapshot.status, "idle");
    }

    #[test]
    fn length_change_replaces_wholesale() {
        let mut snapshot = Snapshot::new();
        snapshot.update(&idle_with_items(&["a", "b", "c"]));

        assert!(snapshot.update(&idle_with_items(&["a", "b", "c", "d"])));
        assert!(snapshot.recent_items_changed);
        assert_eq!(snapshot.recent_items, ["a", "b", "c", "d"]);
    }

    #[test]
    fn missing_marker_empties_the_list() {
        let mut snapshot = Snapshot::new();
        snapshot.update(&idle_with_items(&["a"]));

        assert!(snapshot.update("Synchronization core status: idle\n"));
        assert!(snapshot.recent_items.is_empty());
        assert!(snapshot.recent_items_changed);
    }

    #[test]
    fn list_flag_resets_on_next_quiet_update() {
        let mut snapshot = Snapshot::new();
        snapshot.update(&idle_with_items(&["a"]));
        assert!(snapshot.recent_items_changed);
        snapshot.update("Synchronization core status: busy\nLast synchronized items:\n\tfile: 'a'\n");
        assert!(!snapshot.recent_items_changed);
    }
}
