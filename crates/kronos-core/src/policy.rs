//! Retention policy parameters.
//!
//! A [`RetentionPolicy`] bundles everything the engine needs besides the
//! version list: the maximum age of tagged versions, the keep-tag matcher,
//! and the remove-all override.

use chrono::{DateTime, Duration, Utc};

use crate::decision::{Classification, ClassificationReason};
use crate::engine;
use crate::error::{ConfigError, Result};
use crate::matcher::{KeepPattern, TagMatcher};
use crate::version::VersionRecord;

/// Default maximum age for tagged versions: 7 days.
pub const DEFAULT_MAX_AGE_SECS: i64 = 604_800;

/// Maximum gap between an untagged version and the kept tagged version it
/// belongs to.
pub const CORRELATION_TOLERANCE_SECS: i64 = 10;

/// Parameters of a retention evaluation.
///
/// # Examples
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use kronos_core::{Decision, RetentionPolicy, VersionRecord};
///
/// let policy = RetentionPolicy::from_seconds(3600, "^release-").unwrap();
/// let now = Utc::now();
/// let versions = vec![
///     VersionRecord::new(1, ["release-1.0"], now - Duration::days(400)),
///     VersionRecord::new(2, ["nightly"], now - Duration::days(2)),
/// ];
///
/// let classification = policy.classify(&versions, now);
/// assert_eq!(classification.results()[0].decision, Decision::Keep);
/// assert_eq!(classification.results()[1].decision, Decision::Delete);
/// ```
#[derive(Debug, Clone)]
pub struct RetentionPolicy<M = KeepPattern> {
    max_age: Duration,
    keep: M,
    force_delete_all: bool,
}

impl RetentionPolicy<KeepPattern> {
    /// Builds a policy from a maximum age in seconds and a keep-tag regular
    /// expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxAge`] for a negative or out-of-range
    /// age and [`ConfigError::InvalidPattern`] if the pattern does not compile.
    pub fn from_seconds(max_age_secs: i64, keep_pattern: &str) -> Result<Self> {
        let max_age = Duration::try_seconds(max_age_secs)
            .ok_or(ConfigError::InvalidMaxAge { seconds: max_age_secs })?;
        Self::new(max_age, KeepPattern::new(keep_pattern)?)
    }

    /// Describes `reason` with the policy parameters that produced it.
    ///
    /// Keep-pattern reasons name the pattern and age reasons name the
    /// maximum age in seconds. Other reasons read as their `Display` text.
    #[must_use]
    pub fn explain(&self, reason: &ClassificationReason) -> String {
        match reason {
            ClassificationReason::MatchesKeepPattern => {
                format!("{reason} '{}'", self.keep.as_str())
            }
            ClassificationReason::NewerThanMaxAge | ClassificationReason::OlderThanMaxAge => {
                format!("{reason} '{}s'", self.max_age.num_seconds())
            }
            _ => reason.to_string(),
        }
    }
}

impl Default for RetentionPolicy<KeepPattern> {
    fn default() -> Self {
        Self {
            max_age: Duration::seconds(DEFAULT_MAX_AGE_SECS),
            keep: KeepPattern::default(),
            force_delete_all: false,
        }
    }
}

impl<M: TagMatcher> RetentionPolicy<M> {
    /// Creates a policy with the given maximum age and keep-tag matcher.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxAge`] if `max_age` is negative.
    pub fn new(max_age: Duration, keep: M) -> Result<Self> {
        if max_age < Duration::zero() {
            return Err(ConfigError::InvalidMaxAge {
                seconds: max_age.num_seconds(),
            });
        }

        Ok(Self {
            max_age,
            keep,
            force_delete_all: false,
        })
    }

    /// Enables or disables the remove-all override.
    ///
    /// When enabled, every version is marked for deletion and no other rule
    /// is evaluated.
    #[must_use]
    pub const fn with_force_delete_all(mut self, force: bool) -> Self {
        self.force_delete_all = force;
        self
    }

    /// Returns the maximum age of retained tagged versions.
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns the keep-tag matcher.
    #[must_use]
    pub const fn keep_matcher(&self) -> &M {
        &self.keep
    }

    /// Returns true if the remove-all override is active.
    #[must_use]
    pub const fn is_force_delete_all(&self) -> bool {
        self.force_delete_all
    }

    /// Returns the age cutoff: tagged versions created strictly after this
    /// instant are young enough to keep.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Classifies `versions` against this policy as of `now`.
    #[must_use]
    pub fn classify(&self, versions: &[VersionRecord], now: DateTime<Utc>) -> Classification {
        engine::classify(versions, self, now)
    }
}
