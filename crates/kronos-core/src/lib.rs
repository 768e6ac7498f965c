//! # Kronos Core
//!
//! Version model and retention policy engine for container image cleanup.
//!
//! Given every version of a package, the engine decides which ones to keep
//! and which ones to delete, and attaches one auditable reason to each
//! decision:
//!
//! - [`VersionRecord`] - One version as reported by the registry
//! - [`RetentionPolicy`] - Maximum age, keep-tag matcher, remove-all override
//! - [`classify`] - The pure classification function
//! - [`Classification`] - Ordered [`ClassificationResult`]s for one run
//!
//! The engine does no I/O. Fetching versions and deleting them lives in
//! `kronos-registry`.
//!
//! ## Example
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use kronos_core::{ClassificationReason, Decision, RetentionPolicy, VersionRecord};
//!
//! let now = Utc::now();
//! let versions = vec![
//!     // Multi-arch manifest list and one of its platform manifests.
//!     VersionRecord::new(1, ["latest", "git-commit-abcd"], now),
//!     VersionRecord::new(2, Vec::<String>::new(), now + Duration::seconds(3)),
//!     // Leftover from an older build.
//!     VersionRecord::new(3, Vec::<String>::new(), now - Duration::days(2)),
//! ];
//!
//! let policy = RetentionPolicy::from_seconds(604_800, "^(latest-|git-tag-)").unwrap();
//! let classification = policy.classify(&versions, now);
//!
//! let orphan = classification.get(2).unwrap();
//! assert_eq!(orphan.decision, Decision::Keep);
//! assert_eq!(orphan.reason, ClassificationReason::CorrelatedWithKeptVersion(1));
//! assert_eq!(classification.get(3).unwrap().reason, ClassificationReason::Orphan);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decision;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod policy;
pub mod version;

#[cfg(test)]
mod proptest_tests;

// Re-export main types at crate root
pub use decision::{Classification, ClassificationReason, ClassificationResult, Decision};
pub use engine::classify;
pub use error::{ConfigError, Result};
pub use matcher::{KeepPattern, TagMatcher, DEFAULT_KEEP_PATTERN};
pub use policy::{RetentionPolicy, CORRELATION_TOLERANCE_SECS, DEFAULT_MAX_AGE_SECS};
pub use version::{
    parse_timestamp, ContainerMetadata, PackageMetadata, PackageVersion, VersionRecord,
};
