//! Audit sink that writes to the tracing pipeline.

use crate::application::ports::AuditSink;
use crate::domain::audit::{AuditError, AuditEvent};
use tracing::warn;

/// Target used for audit records, so subscribers can route them separately.
pub const AUDIT_TARGET: &str = "abuse_guard::audit";

/// Default audit sink: one `WARN` event per audit record.
///
/// Never fails. Persisting audit records is left to whatever subscriber
/// consumes the [`AUDIT_TARGET`] target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Create a new tracing audit sink.
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        warn!(
            target: "abuse_guard::audit",
            kind = %event.kind,
            actor = ?event.actor.map(|a| a.as_i64()),
            admin = ?event.admin.map(|a| a.as_i64()),
            details = ?event.details,
            "audit event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::ActorId;
    use crate::domain::audit::AuditKind;
    use crate::infrastructure::mocks::MockCaptureLayer;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_audit_event_is_logged_on_audit_target() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let event = AuditEvent::new(AuditKind::SpamDetected, Some(ActorId::new(42)))
            .with_detail("reason", "flood");

        tracing::subscriber::with_default(subscriber, || {
            TracingAuditSink::new().record(&event).unwrap();
        });

        let captured = capture.find("audit event").unwrap();
        assert_eq!(captured.target, AUDIT_TARGET);
        assert_eq!(captured.level, tracing::Level::WARN);
        assert_eq!(captured.field("kind"), Some("spam_detected"));
        assert_eq!(captured.field("actor"), Some("Some(42)"));
    }
}
