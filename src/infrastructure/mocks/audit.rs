//! Audit sinks for testing.

use crate::application::ports::AuditSink;
use crate::domain::audit::{AuditError, AuditEvent};
use std::sync::{Arc, Mutex};

/// Sink that keeps every event in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the gate
/// and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl RecordingAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .expect("RecordingAuditSink mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .expect("RecordingAuditSink mutex poisoned - a test thread panicked while holding the lock")
            .push(event.clone());
        Ok(())
    }
}

/// Sink whose every write fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn record(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Err(AuditError("audit store unavailable".to_string()))
    }
}
