//! Property-based tests for the retention engine.
//!
//! These tests use proptest to verify classification invariants across many
//! randomly generated version lists.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::{classify, ClassificationReason, Decision, KeepPattern, RetentionPolicy, VersionRecord};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Strategy for generating tags that never match `^keep-`.
fn plain_tag_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "(latest|nightly|main|v[0-9]\\.[0-9]\\.[0-9])",
        "git-commit-[a-f0-9]{7}",
        "sha-[a-f0-9]{7}",
    ]
}

/// Strategy for generating a version's tag list.
fn tags_strategy() -> impl Strategy<Value = Vec<String>> {
    prop_oneof![
        Just(Vec::new()),
        prop::collection::vec(plain_tag_strategy(), 1..4),
        (prop::collection::vec(plain_tag_strategy(), 0..3), "keep-[a-z]{3,8}").prop_map(
            |(mut tags, keep)| {
                tags.push(keep);
                tags
            }
        ),
    ]
}

/// Strategy for generating a version list with unique ids.
fn versions_strategy() -> impl Strategy<Value = Vec<VersionRecord>> {
    prop::collection::vec((tags_strategy(), 0i64..(60 * 60 * 24 * 60)), 0..24).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (tags, age_secs))| {
                VersionRecord::new(i as u64 + 1, tags, now() - Duration::seconds(age_secs))
            })
            .collect()
    })
}

fn policy(max_age_secs: i64) -> RetentionPolicy {
    RetentionPolicy::new(
        Duration::seconds(max_age_secs),
        KeepPattern::new("^keep-").unwrap(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn force_delete_all_deletes_everything(
        versions in versions_strategy(),
        max_age in 0i64..1_000_000,
    ) {
        let policy = policy(max_age).with_force_delete_all(true);
        let classification = classify(&versions, &policy, now());

        prop_assert_eq!(classification.len(), versions.len());
        for result in classification.results() {
            prop_assert_eq!(result.decision, Decision::Delete);
            prop_assert_eq!(result.reason, ClassificationReason::ForcedDeleteAll);
        }
    }

    #[test]
    fn output_is_a_permutation_of_input(
        versions in versions_strategy(),
        max_age in 0i64..1_000_000,
    ) {
        let classification = classify(&versions, &policy(max_age), now());

        prop_assert_eq!(classification.len(), versions.len());
        let input: HashSet<u64> = versions.iter().map(|v| v.id).collect();
        let output: HashSet<u64> = classification.results().iter().map(|r| r.version.id).collect();
        prop_assert_eq!(input, output);
    }

    #[test]
    fn keep_pattern_always_keeps(
        versions in versions_strategy(),
        max_age in 0i64..1_000_000,
    ) {
        let classification = classify(&versions, &policy(max_age), now());

        for result in classification.results() {
            if result.version.tags.iter().any(|t| t.starts_with("keep-")) {
                prop_assert_eq!(result.decision, Decision::Keep);
                prop_assert_eq!(result.reason, ClassificationReason::MatchesKeepPattern);
            }
        }
    }

    #[test]
    fn tagged_without_match_follows_strict_cutoff(
        versions in versions_strategy(),
        max_age in 0i64..1_000_000,
    ) {
        let cutoff = now() - Duration::seconds(max_age);
        let classification = classify(&versions, &policy(max_age), now());

        for result in classification.results() {
            let tags = &result.version.tags;
            let sole_git_commit = tags.len() == 1 && tags[0].starts_with("git-commit-");
            if tags.is_empty() || sole_git_commit || tags.iter().any(|t| t.starts_with("keep-")) {
                continue;
            }
            let expected = if result.version.created_at > cutoff {
                Decision::Keep
            } else {
                Decision::Delete
            };
            prop_assert_eq!(result.decision, expected);
        }
    }

    #[test]
    fn orphans_are_kept_only_near_kept_tagged_versions(
        versions in versions_strategy(),
        max_age in 0i64..1_000_000,
    ) {
        let classification = classify(&versions, &policy(max_age), now());

        for result in classification.results() {
            match result.reason {
                ClassificationReason::CorrelatedWithKeptVersion(parent_id) => {
                    let parent = classification.get(parent_id).unwrap();
                    prop_assert_eq!(parent.decision, Decision::Keep);
                    prop_assert!(parent.reason.correlated_id().is_none());
                    let gap = (result.version.created_at - parent.version.created_at).abs();
                    prop_assert!(gap <= Duration::seconds(10));
                }
                ClassificationReason::Orphan => {
                    prop_assert_eq!(result.decision, Decision::Delete);
                    let near_kept = classification.kept().any(|kept| {
                        kept.reason.correlated_id().is_none()
                            && (result.version.created_at - kept.version.created_at).abs()
                                <= Duration::seconds(10)
                    });
                    prop_assert!(!near_kept);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn classification_is_repeatable(
        versions in versions_strategy(),
        max_age in 0i64..1_000_000,
    ) {
        let policy = policy(max_age);
        let first = classify(&versions, &policy, now());
        let second = classify(&versions, &policy, now());
        prop_assert_eq!(first, second);
    }
}
