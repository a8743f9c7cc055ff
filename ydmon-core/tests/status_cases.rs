//! Table-driven checks of status text against the resulting snapshot.

use rstest::rstest;
use ydmon_core::Snapshot;

fn snapshot_with_status(status: &str) -> Snapshot {
    let mut snapshot = Snapshot::new();
    snapshot.status = status.to_string();
    snapshot
}

#[rstest]
#[case::busy_to_idle("busy", "Synchronization core status: idle\nTotal: 10 GB\n", "idle", true)]
#[case::idle_to_none("idle", "", "none", true)]
#[case::none_stays_none("none", "", "none", false)]
#[case::unknown_to_paused("unknown", "Synchronization core status: paused\n", "paused", true)]
#[case::status_missing_keeps_value("idle", "Trash size: 0 B\n", "idle", true)]
#[case::unknown_keys_only("idle", "Max file size: 50 GB\n", "idle", false)]
fn status_transitions(
    #[case] prior: &str,
    #[case] text: &str,
    #[case] expected: &str,
    #[case] changed: bool,
) {
    let mut snapshot = snapshot_with_status(prior);
    assert_eq!(snapshot.update(text), changed);
    assert_eq!(snapshot.status, expected);
    assert_eq!(snapshot.previous_status, prior);
}

#[rstest]
#[case("Synchronization core status: busy\nSync progress: 65.34 MB/ 139.38 MB (46 %)\n", "65.34 MB/ 139.38 MB (46 %)")]
#[case("Synchronization core status: index\nSync progress: \n", "")]
#[case("Synchronization core status: idle\n", "")]
fn progress_is_only_kept_while_reported(#[case] text: &str, #[case] progress: &str) {
    let mut snapshot = Snapshot::new();
    snapshot.progress = "stale".to_string();
    snapshot.update(text);
    assert_eq!(snapshot.progress, progress);
}

#[test]
fn snapshot_json_uses_field_names() {
    let mut snapshot = Snapshot::new();
    snapshot.update("Synchronization core status: idle\nTotal: 10 GB\nLast synchronized items:\n\tfile: 'a'\n");

    let json = serde_json::to_value(&snapshot).expect("serialize");
    assert_eq!(json["status"], "idle");
    assert_eq!(json["previous_status"], "unknown");
    assert_eq!(json["total_space"], "10 GB");
    assert_eq!(json["recent_items"][0], "a");
    assert_eq!(json["recent_items_changed"], true);

    let back: Snapshot = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, snapshot);
}
