//! Audit event definitions.
//!
//! Deletions are irreversible, so every retention decision and every
//! removal attempt is recorded as a structured event.

use chrono::{DateTime, Utc};
use kronos_core::{ClassificationResult, Decision};
use serde::{Deserialize, Serialize};
use uuid::{Timestamp, Uuid};

/// Generates a new v7 UUID for audit events and cleanup runs.
#[must_use]
pub fn new_event_id() -> Uuid {
    let ts = Timestamp::now(uuid::NoContext);
    Uuid::new_v7(ts)
}

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    /// Informational event
    #[default]
    Info,
    /// Error event
    Error,
}

/// Outcome of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded
    Success,
    /// Operation was simulated (dry run)
    Simulated,
    /// Operation failed
    Failure,
}

/// Base trait for all audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type identifier.
    fn event_type(&self) -> &'static str;

    /// Returns the event severity.
    fn severity(&self) -> EventSeverity;

    /// Returns the event timestamp.
    fn timestamp(&self) -> DateTime<Utc>;

    /// Returns the cleanup run this event belongs to.
    fn run_id(&self) -> Option<&str>;
}

/// A retention decision for one package version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Package in `namespace/package` form
    pub package: String,

    /// Registry version ID
    pub version_id: u64,

    /// Version name (manifest digest)
    pub version_name: Option<String>,

    /// Tags on the version
    pub tags: Vec<String>,

    /// Version creation time
    pub created_at: DateTime<Utc>,

    /// Keep or delete
    pub decision: Decision,

    /// Machine-readable reason code
    pub reason_code: String,

    /// Human-readable reason
    pub reason: String,

    /// Kept tagged version an untagged version was tied to
    pub correlated_version_id: Option<u64>,

    /// Cleanup run ID
    pub run_id: Option<String>,
}

impl RetentionEvent {
    /// Creates an event from a classification result.
    #[must_use]
    pub fn from_result(package: &str, result: &ClassificationResult) -> Self {
        Self {
            id: new_event_id(),
            timestamp: Utc::now(),
            package: package.to_string(),
            version_id: result.version.id,
            version_name: result.version.name.clone(),
            tags: result.version.tags.clone(),
            created_at: result.version.created_at,
            decision: result.decision,
            reason_code: result.reason.code().to_string(),
            reason: result.reason.to_string(),
            correlated_version_id: result.reason.correlated_id(),
            run_id: None,
        }
    }

    /// Sets the cleanup run ID.
    #[must_use]
    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }

    /// Replaces the human-readable reason, e.g. with one naming the policy
    /// parameters.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

impl AuditEvent for RetentionEvent {
    fn event_type(&self) -> &'static str {
        match self.decision {
            Decision::Keep => "retention.keep",
            Decision::Delete => "retention.delete",
        }
    }

    fn severity(&self) -> EventSeverity {
        EventSeverity::Info
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }
}

/// A removal attempt for one package version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Package in `namespace/package` form
    pub package: String,

    /// Registry version ID
    pub version_id: u64,

    /// Whether the removal was only simulated
    pub dry_run: bool,

    /// Event outcome
    pub outcome: EventOutcome,

    /// Error details for failed removals
    pub details: Option<String>,

    /// Cleanup run ID
    pub run_id: Option<String>,
}

impl DeletionEvent {
    fn new(package: &str, version_id: u64, dry_run: bool, outcome: EventOutcome) -> Self {
        Self {
            id: new_event_id(),
            timestamp: Utc::now(),
            package: package.to_string(),
            version_id,
            dry_run,
            outcome,
            details: None,
            run_id: None,
        }
    }

    /// Creates an event for a simulated removal.
    #[must_use]
    pub fn simulated(package: &str, version_id: u64) -> Self {
        Self::new(package, version_id, true, EventOutcome::Simulated)
    }

    /// Creates an event for a completed removal.
    #[must_use]
    pub fn removed(package: &str, version_id: u64) -> Self {
        Self::new(package, version_id, false, EventOutcome::Success)
    }

    /// Creates an event for a failed removal.
    #[must_use]
    pub fn failed(package: &str, version_id: u64, error: &str) -> Self {
        let mut event = Self::new(package, version_id, false, EventOutcome::Failure);
        event.details = Some(error.to_string());
        event
    }

    /// Sets the cleanup run ID.
    #[must_use]
    pub fn with_run_id(mut self, run_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self
    }
}

impl AuditEvent for DeletionEvent {
    fn event_type(&self) -> &'static str {
        match self.outcome {
            EventOutcome::Simulated => "deletion.simulated",
            EventOutcome::Success => "deletion.removed",
            EventOutcome::Failure => "deletion.failed",
        }
    }

    fn severity(&self) -> EventSeverity {
        match self.outcome {
            EventOutcome::Simulated | EventOutcome::Success => EventSeverity::Info,
            EventOutcome::Failure => EventSeverity::Error,
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }
}
