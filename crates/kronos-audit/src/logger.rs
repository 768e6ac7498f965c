//! Audit logger implementation.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use tracing::{error, info};

use crate::event::{AuditEvent, EventSeverity};

/// Backend trait for audit log storage.
pub trait LoggerBackend: Send + Sync + Debug {
    /// Records one serialized audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be written.
    fn log(
        &self,
        event_type: &str,
        severity: EventSeverity,
        event_json: &str,
    ) -> Result<(), LoggerError>;

    /// Returns the backend name for identification.
    fn name(&self) -> &'static str;
}

/// Errors that can occur during audit logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Serialization error
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Audit logger that fans events out to configured backends.
#[derive(Debug)]
pub struct AuditLogger {
    backends: Vec<Arc<dyn LoggerBackend>>,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AuditLogger {
    /// Creates a builder for configuring the logger.
    #[must_use]
    pub fn builder() -> AuditLoggerBuilder {
        AuditLoggerBuilder::new()
    }

    /// Creates a logger that writes through `tracing`.
    #[must_use]
    pub fn tracing() -> Self {
        Self::builder()
            .with_backend(Arc::new(TracingBackend))
            .build()
    }

    /// Logs an audit event to all configured backends.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be serialized.
    /// Backend errors are logged but do not cause this method to fail.
    pub fn log<E: AuditEvent>(&self, event: &E) -> Result<(), LoggerError> {
        let json = serde_json::to_string(event)?;

        for backend in &self.backends {
            if let Err(e) = backend.log(event.event_type(), event.severity(), &json) {
                error!(backend = backend.name(), error = %e, "Failed to write audit event");
            }
        }

        Ok(())
    }
}

/// Builder for configuring an audit logger.
#[derive(Debug)]
pub struct AuditLoggerBuilder {
    backends: Vec<Arc<dyn LoggerBackend>>,
}

impl Default for AuditLoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLoggerBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Adds a backend to the logger.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn LoggerBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Builds the audit logger.
    #[must_use]
    pub fn build(self) -> AuditLogger {
        AuditLogger {
            backends: self.backends,
        }
    }
}

/// Backend that emits events through `tracing` under the `kronos::audit` target.
#[derive(Debug, Default)]
pub struct TracingBackend;

impl LoggerBackend for TracingBackend {
    fn log(
        &self,
        event_type: &str,
        severity: EventSeverity,
        event_json: &str,
    ) -> Result<(), LoggerError> {
        match severity {
            EventSeverity::Info => {
                info!(
                    target: "kronos::audit",
                    event_type,
                    audit_event = %event_json,
                    "Audit event"
                );
            }
            EventSeverity::Error => {
                error!(
                    target: "kronos::audit",
                    event_type,
                    audit_event = %event_json,
                    "Audit event"
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// In-memory backend for testing.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    events: Mutex<Vec<String>>,
}

impl InMemoryBackend {
    /// Creates a new in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all logged events as JSON strings.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl LoggerBackend for InMemoryBackend {
    fn log(
        &self,
        _event_type: &str,
        _severity: EventSeverity,
        event_json: &str,
    ) -> Result<(), LoggerError> {
        self.events
            .lock()
            .map_err(|e| LoggerError::Backend(e.to_string()))?
            .push(event_json.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
