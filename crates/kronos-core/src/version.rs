//! Container image version records.
//!
//! A [`VersionRecord`] is one existing package version as reported by the
//! registry. Records serialize to and from the GHCR package-version wire
//! format ([`PackageVersion`]), where tags live under
//! `metadata.container.tags`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// One existing artifact version in the registry.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use kronos_core::VersionRecord;
///
/// let version = VersionRecord::new(42, ["latest", "git-commit-abc1234"], Utc::now());
/// assert!(version.is_tagged());
/// assert_eq!(version.tags.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PackageVersion", into = "PackageVersion")]
pub struct VersionRecord {
    /// Registry-assigned identifier, stable for the version's lifetime.
    pub id: u64,

    /// Tags attached to this version (may be empty).
    pub tags: Vec<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Version name; on GHCR this is the manifest digest.
    pub name: Option<String>,

    /// Last update timestamp, when the registry reports one.
    pub updated_at: Option<DateTime<Utc>>,
}

impl VersionRecord {
    /// Creates a new version record.
    #[must_use]
    pub fn new<I, S>(id: u64, tags: I, created_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            tags: tags.into_iter().map(Into::into).collect(),
            created_at,
            name: None,
            updated_at: None,
        }
    }

    /// Creates a version record from an RFC 3339 creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimestamp`] if `created_at` is not a
    /// valid RFC 3339 timestamp.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kronos_core::VersionRecord;
    ///
    /// let version =
    ///     VersionRecord::parse(7, Vec::<String>::new(), "2024-05-01T12:00:00Z").unwrap();
    /// assert!(!version.is_tagged());
    ///
    /// assert!(VersionRecord::parse(8, Vec::<String>::new(), "not a date").is_err());
    /// ```
    pub fn parse<I, S>(id: u64, tags: I, created_at: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(id, tags, parse_timestamp(created_at)?))
    }

    /// Sets the version name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the last update timestamp.
    #[must_use]
    pub const fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Returns true if the version carries at least one tag.
    #[must_use]
    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }

    /// Returns the name for display, or `N/A` when the registry gave none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("N/A")
    }
}

/// Parses an RFC 3339 timestamp into UTC.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTimestamp`] on malformed input.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ConfigError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// GHCR package version, as returned by the packages API.
///
/// Timestamps are kept as the raw strings the registry sent. Converting
/// into a [`VersionRecord`] validates `created_at`; an unparseable
/// `updated_at` is informational only and becomes `None`.
///
/// # Examples
///
/// ```rust
/// use kronos_core::{PackageVersion, VersionRecord};
///
/// let wire: PackageVersion = serde_json::from_str(
///     r#"{"id": 1, "created_at": "2024-05-01T12:00:00Z", "updated_at": "soon"}"#,
/// ).unwrap();
/// let version = VersionRecord::try_from(wire).unwrap();
/// assert!(version.updated_at.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersion {
    /// Registry-assigned identifier.
    pub id: u64,

    /// Version name (manifest digest).
    #[serde(default)]
    pub name: Option<String>,

    /// Raw creation timestamp.
    pub created_at: String,

    /// Raw last update timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Package-type specific metadata.
    #[serde(default)]
    pub metadata: PackageMetadata,
}

/// The `metadata` object of a package version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Container metadata; absent for untagged or non-container versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerMetadata>,
}

/// The `metadata.container` object of a package version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerMetadata {
    /// Tags attached to the version.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<PackageVersion> for VersionRecord {
    type Error = ConfigError;

    fn try_from(wire: PackageVersion) -> Result<Self> {
        Ok(Self {
            id: wire.id,
            tags: wire.metadata.container.map(|c| c.tags).unwrap_or_default(),
            created_at: parse_timestamp(&wire.created_at)?,
            name: wire.name,
            updated_at: wire
                .updated_at
                .as_deref()
                .and_then(|value| parse_timestamp(value).ok()),
        })
    }
}

impl From<VersionRecord> for PackageVersion {
    fn from(record: VersionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            created_at: format_timestamp(record.created_at),
            updated_at: record.updated_at.map(format_timestamp),
            metadata: PackageMetadata {
                container: Some(ContainerMetadata { tags: record.tags }),
            },
        }
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
