//! Retention decision engine.
//!
//! Classification runs in four steps:
//!
//! 1. The remove-all override short-circuits everything to `delete`.
//! 2. Versions are partitioned into *tagged* and *potential orphans*. A
//!    version whose only tag is a `git-commit-*` tag counts as untagged.
//! 3. Tagged versions are kept when a tag matches the keep pattern or when
//!    they are younger than the maximum age. Kept ones go into an
//!    insertion-ordered correlation table.
//! 4. Potential orphans are kept when their creation time is within
//!    [`CORRELATION_TOLERANCE_SECS`] of a kept tagged version. Multi-arch
//!    builds push one tagged manifest list and several untagged per-platform
//!    manifests at the same moment; deleting the children of a kept list
//!    would break it.
//!
//! The engine performs no I/O and is deterministic for a fixed `now`.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::decision::{Classification, ClassificationReason, ClassificationResult};
use crate::matcher::{is_git_commit_tag, TagMatcher};
use crate::policy::{RetentionPolicy, CORRELATION_TOLERANCE_SECS};
use crate::version::VersionRecord;

/// Classifies every version as keep or delete.
///
/// Results list tagged versions first, then potential orphans, each group
/// in input order. The output always has one entry per input version.
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use kronos_core::{classify, ClassificationReason, RetentionPolicy, VersionRecord};
///
/// let now = Utc::now();
/// let versions = vec![
///     VersionRecord::new(1, Vec::<String>::new(), now),
///     VersionRecord::new(2, ["latest"], now),
/// ];
///
/// let policy = RetentionPolicy::default();
/// let classification = classify(&versions, &policy, now);
///
/// assert_eq!(classification.results()[0].version.id, 2);
/// assert_eq!(
///     classification.results()[1].reason,
///     ClassificationReason::CorrelatedWithKeptVersion(2)
/// );
/// ```
#[must_use]
pub fn classify<M: TagMatcher>(
    versions: &[VersionRecord],
    policy: &RetentionPolicy<M>,
    now: DateTime<Utc>,
) -> Classification {
    if policy.is_force_delete_all() {
        let results = versions
            .iter()
            .map(|v| ClassificationResult::delete(v.clone(), ClassificationReason::ForcedDeleteAll))
            .map(record)
            .collect();
        return Classification::from_results(results);
    }

    let (tagged, potential_orphans): (Vec<&VersionRecord>, Vec<&VersionRecord>) =
        versions.iter().partition(|v| has_release_tags(v));

    let cutoff = policy.cutoff(now);
    let mut results = Vec::with_capacity(versions.len());
    let mut kept_tagged: Vec<(u64, DateTime<Utc>)> = Vec::new();

    for version in tagged {
        let result = classify_tagged(version, policy.keep_matcher(), cutoff);
        if result.is_keep() {
            kept_tagged.push((version.id, version.created_at));
        }
        results.push(record(result));
    }

    let tolerance = Duration::seconds(CORRELATION_TOLERANCE_SECS);
    for version in potential_orphans {
        results.push(record(classify_orphan(version, &kept_tagged, tolerance)));
    }

    Classification::from_results(results)
}

/// Returns true if the version carries a tag that identifies a release.
///
/// A lone `git-commit-*` tag is build provenance, not a release.
fn has_release_tags(version: &VersionRecord) -> bool {
    match version.tags.as_slice() {
        [] => false,
        [only] => !is_git_commit_tag(only),
        _ => true,
    }
}

fn classify_tagged<M: TagMatcher>(
    version: &VersionRecord,
    keep: &M,
    cutoff: DateTime<Utc>,
) -> ClassificationResult {
    if version.tags.iter().any(|tag| keep.matches(tag)) {
        ClassificationResult::keep(version.clone(), ClassificationReason::MatchesKeepPattern)
    } else if version.created_at > cutoff {
        ClassificationResult::keep(version.clone(), ClassificationReason::NewerThanMaxAge)
    } else {
        ClassificationResult::delete(version.clone(), ClassificationReason::OlderThanMaxAge)
    }
}

/// First kept version in insertion order wins, not the closest one.
fn classify_orphan(
    version: &VersionRecord,
    kept_tagged: &[(u64, DateTime<Utc>)],
    tolerance: Duration,
) -> ClassificationResult {
    let parent = kept_tagged
        .iter()
        .find(|(_, created_at)| (version.created_at - *created_at).abs() <= tolerance);

    match parent {
        Some(&(id, _)) => ClassificationResult::keep(
            version.clone(),
            ClassificationReason::CorrelatedWithKeptVersion(id),
        ),
        None => ClassificationResult::delete(version.clone(), ClassificationReason::Orphan),
    }
}

fn record(result: ClassificationResult) -> ClassificationResult {
    debug!(
        version_id = result.version.id,
        decision = %result.decision,
        reason = result.reason.code(),
        "Classified version"
    );
    result
}
