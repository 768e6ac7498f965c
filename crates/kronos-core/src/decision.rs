//! Retention decision types.
//!
//! This module defines the [`ClassificationResult`] produced for every
//! version by the retention engine, together with the [`Decision`] and the
//! single [`ClassificationReason`] that justifies it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::version::VersionRecord;

/// Whether a version is retained or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// The version is retained.
    Keep,
    /// The version is removed from the registry.
    Delete,
}

impl Decision {
    /// Returns the lowercase label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The justification attached to a decision.
///
/// Exactly one reason is attached to each decision. The engine evaluates
/// rules in a fixed order, so reasons never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", content = "kept_version_id", rename_all = "kebab-case")]
pub enum ClassificationReason {
    /// A tag matched the keep pattern.
    MatchesKeepPattern,
    /// Tagged and created after the age cutoff.
    NewerThanMaxAge,
    /// Tagged and created at or before the age cutoff.
    OlderThanMaxAge,
    /// Untagged, created within the tolerance window of a kept tagged version.
    CorrelatedWithKeptVersion(u64),
    /// Untagged with no kept tagged version nearby.
    Orphan,
    /// All policy bypassed by the remove-all override.
    ForcedDeleteAll,
}

impl ClassificationReason {
    /// Returns the stable machine-readable code for this reason.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kronos_core::ClassificationReason;
    ///
    /// assert_eq!(ClassificationReason::Orphan.code(), "orphan");
    /// assert_eq!(
    ///     ClassificationReason::CorrelatedWithKeptVersion(7).code(),
    ///     "correlated-with-kept-version"
    /// );
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MatchesKeepPattern => "matches-keep-pattern",
            Self::NewerThanMaxAge => "newer-than-max-age",
            Self::OlderThanMaxAge => "older-than-max-age",
            Self::CorrelatedWithKeptVersion(_) => "correlated-with-kept-version",
            Self::Orphan => "orphan",
            Self::ForcedDeleteAll => "forced-delete-all",
        }
    }

    /// Returns the id of the kept version an orphan was correlated with.
    #[must_use]
    pub const fn correlated_id(&self) -> Option<u64> {
        match self {
            Self::CorrelatedWithKeptVersion(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for ClassificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchesKeepPattern => f.write_str("Tagged version matches keep pattern"),
            Self::NewerThanMaxAge => f.write_str("Tagged version newer than maximum age"),
            Self::OlderThanMaxAge => f.write_str("Tagged version older than maximum age"),
            Self::CorrelatedWithKeptVersion(id) => {
                write!(f, "Untagged version matches timestamp of kept version {id}")
            }
            Self::Orphan => f.write_str("Orphan version"),
            Self::ForcedDeleteAll => f.write_str("Marked for deletion by remove-all override"),
        }
    }
}

/// The decision for a single version.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use kronos_core::{ClassificationReason, ClassificationResult, VersionRecord};
///
/// let version = VersionRecord::new(1, Vec::<String>::new(), Utc::now());
/// let result = ClassificationResult::delete(version, ClassificationReason::Orphan);
/// assert!(result.is_delete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The classified version.
    pub version: VersionRecord,

    /// Keep or delete.
    pub decision: Decision,

    /// Why the decision was made.
    pub reason: ClassificationReason,
}

impl ClassificationResult {
    /// Creates a keep decision.
    #[must_use]
    pub const fn keep(version: VersionRecord, reason: ClassificationReason) -> Self {
        Self {
            version,
            decision: Decision::Keep,
            reason,
        }
    }

    /// Creates a delete decision.
    #[must_use]
    pub const fn delete(version: VersionRecord, reason: ClassificationReason) -> Self {
        Self {
            version,
            decision: Decision::Delete,
            reason,
        }
    }

    /// Returns true if the version is retained.
    #[must_use]
    pub fn is_keep(&self) -> bool {
        self.decision == Decision::Keep
    }

    /// Returns true if the version is marked for removal.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.decision == Decision::Delete
    }
}

/// The ordered outcome of one evaluation run.
///
/// Tagged versions come first in their input order, followed by the
/// potential orphans in their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    results: Vec<ClassificationResult>,
}

impl Classification {
    pub(crate) const fn from_results(results: Vec<ClassificationResult>) -> Self {
        Self { results }
    }

    /// Returns all results in classification order.
    #[must_use]
    pub fn results(&self) -> &[ClassificationResult] {
        &self.results
    }

    /// Returns the number of classified versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over the retained versions.
    pub fn kept(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.results.iter().filter(|r| r.is_keep())
    }

    /// Iterates over the versions marked for removal, in classification order.
    pub fn to_delete(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.results.iter().filter(|r| r.is_delete())
    }

    /// Returns `(kept, deleted)` counts.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let kept = self.kept().count();
        (kept, self.results.len() - kept)
    }

    /// Looks up the result for a version id.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&ClassificationResult> {
        self.results.iter().find(|r| r.version.id == id)
    }
}

impl IntoIterator for Classification {
    type Item = ClassificationResult;
    type IntoIter = std::vec::IntoIter<ClassificationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a Classification {
    type Item = &'a ClassificationResult;
    type IntoIter = std::slice::Iter<'a, ClassificationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
