//! Integration tests for the retention engine.
//!
//! Each test mirrors a real cleanup situation on a container registry.

use chrono::{DateTime, Duration, TimeZone, Utc};
use kronos_core::{
    classify, ClassificationReason, Decision, KeepPattern, RetentionPolicy, VersionRecord,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 15, 8, 30, 0).unwrap()
}

fn untagged(id: u64, created_at: DateTime<Utc>) -> VersionRecord {
    VersionRecord::new(id, Vec::<String>::new(), created_at)
}

// =============================================================================
// Recent builds and stale orphans
// =============================================================================

#[test]
fn test_recent_tagged_kept_and_stale_untagged_deleted() {
    let mut versions: Vec<VersionRecord> = (1..=6)
        .map(|id| VersionRecord::new(id, ["tag1", "latest"], now()))
        .collect();
    versions.extend((101..=106).map(|id| untagged(id, now() - Duration::days(1))));

    let policy = RetentionPolicy::new(Duration::days(7), KeepPattern::new("^preserve-").unwrap())
        .unwrap();
    let classification = classify(&versions, &policy, now());

    assert_eq!(classification.len(), 12);
    for result in &classification.results()[..6] {
        assert!(result.version.id <= 6);
        assert_eq!(result.decision, Decision::Keep);
        assert_eq!(result.reason, ClassificationReason::NewerThanMaxAge);
    }
    for result in &classification.results()[6..] {
        assert!(result.version.id > 100);
        assert_eq!(result.decision, Decision::Delete);
        assert_eq!(result.reason, ClassificationReason::Orphan);
    }
    assert_eq!(classification.counts(), (6, 6));
}

// =============================================================================
// Multi-arch manifest lists
// =============================================================================

#[test]
fn test_multi_arch_children_follow_their_parent() {
    let t = now() - Duration::hours(2);
    let versions = vec![
        VersionRecord::new(1, ["latest", "git-commit-abcd"], t),
        untagged(2, t + Duration::seconds(3)),
        untagged(3, t - Duration::days(2)),
    ];

    let policy = RetentionPolicy::from_seconds(604_800, "^(latest-|git-tag-)").unwrap();
    let classification = policy.classify(&versions, now());

    let parent = classification.get(1).unwrap();
    assert_eq!(parent.decision, Decision::Keep);
    assert_eq!(parent.reason, ClassificationReason::NewerThanMaxAge);

    let child = classification.get(2).unwrap();
    assert_eq!(child.decision, Decision::Keep);
    assert_eq!(child.reason, ClassificationReason::CorrelatedWithKeptVersion(1));

    let stale = classification.get(3).unwrap();
    assert_eq!(stale.decision, Decision::Delete);
    assert_eq!(stale.reason, ClassificationReason::Orphan);
}

#[test]
fn test_mixed_repository_cleanup() {
    let shared = now() - Duration::days(1);
    let versions = vec![
        VersionRecord::new(1001, ["latest", "git-commit-1a2b3c4"], shared),
        untagged(2001, shared + Duration::seconds(3)),
        untagged(2002, shared + Duration::seconds(7)),
        untagged(3001, now() - Duration::days(2)),
        VersionRecord::new(3002, ["git-commit-9f8e7d6"], now() - Duration::days(3)),
        VersionRecord::new(4001, ["git-tag-v0.1.0"], now() - Duration::days(400)),
        VersionRecord::new(4002, ["feature-x"], now() - Duration::days(3)),
    ];

    let policy = RetentionPolicy::from_seconds(60 * 60 * 24 * 2, "^(latest-|git-tag-)").unwrap();
    let classification = policy.classify(&versions, now());

    let expect = [
        (1001, Decision::Keep, ClassificationReason::NewerThanMaxAge),
        (4001, Decision::Keep, ClassificationReason::MatchesKeepPattern),
        (4002, Decision::Delete, ClassificationReason::OlderThanMaxAge),
        (2001, Decision::Keep, ClassificationReason::CorrelatedWithKeptVersion(1001)),
        (2002, Decision::Keep, ClassificationReason::CorrelatedWithKeptVersion(1001)),
        (3001, Decision::Delete, ClassificationReason::Orphan),
        (3002, Decision::Delete, ClassificationReason::Orphan),
    ];

    assert_eq!(classification.len(), expect.len());
    for (result, (id, decision, reason)) in classification.results().iter().zip(expect) {
        assert_eq!(result.version.id, id);
        assert_eq!(result.decision, decision, "decision for {id}");
        assert_eq!(result.reason, reason, "reason for {id}");
    }

    let doomed: Vec<u64> = classification.to_delete().map(|r| r.version.id).collect();
    assert_eq!(doomed, vec![4002, 3001, 3002]);
}

// =============================================================================
// Remove-all override
// =============================================================================

#[test]
fn test_remove_all_ignores_keep_pattern_and_age() {
    let versions = vec![
        VersionRecord::new(1, ["latest-main"], now() - Duration::days(900)),
        VersionRecord::new(2, ["v2"], now()),
        untagged(3, now()),
    ];

    let policy = RetentionPolicy::default().with_force_delete_all(true);
    let classification = policy.classify(&versions, now());

    assert_eq!(classification.counts(), (0, 3));
    assert!(classification
        .results()
        .iter()
        .all(|r| r.reason == ClassificationReason::ForcedDeleteAll));
}

// =============================================================================
// Wire format
// =============================================================================

#[test]
fn test_classify_decoded_registry_page() {
    let page = r#"[
        {"id": 11, "name": "sha256:01", "created_at": "2024-09-15T08:00:00Z",
         "metadata": {"package_type": "container", "container": {"tags": ["latest-main"]}}},
        {"id": 12, "name": "sha256:02", "created_at": "2024-09-15T08:00:04Z",
         "metadata": {"package_type": "container", "container": {"tags": []}}}
    ]"#;
    let versions: Vec<VersionRecord> = serde_json::from_str(page).unwrap();

    let classification = RetentionPolicy::default().classify(&versions, now());

    assert_eq!(classification.get(11).unwrap().reason, ClassificationReason::MatchesKeepPattern);
    assert_eq!(
        classification.get(12).unwrap().reason,
        ClassificationReason::CorrelatedWithKeptVersion(11)
    );
}
