//! Audit logging for Kronos cleanup runs.
//!
//! This crate records:
//! - Retention decisions (keep/delete with the reason for each version)
//! - Removal attempts (simulated, completed, failed)
//!
//! # Example
//!
//! ```rust
//! use kronos_audit::{AuditLogger, DeletionEvent, InMemoryBackend};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(InMemoryBackend::new());
//! let logger = AuditLogger::builder()
//!     .with_backend(backend.clone())
//!     .build();
//!
//! logger.log(&DeletionEvent::simulated("user/octo/app", 1001)).unwrap();
//! assert_eq!(backend.events().len(), 1);
//! ```

mod event;
mod logger;

pub use event::{
    new_event_id, AuditEvent, DeletionEvent, EventOutcome, EventSeverity, RetentionEvent,
};
pub use logger::{
    AuditLogger, AuditLoggerBuilder, InMemoryBackend, LoggerBackend, LoggerError, TracingBackend,
};
