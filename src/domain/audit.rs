//! Audit events emitted by the gate.

use crate::domain::actor::ActorId;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of security event being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditKind {
    /// An actor was flagged by the spam detector and blocked
    SpamDetected,
    /// A non-admin tried to run an admin command
    UnauthorizedAdminAttempt,
}

impl AuditKind {
    /// Stable event type name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditKind::SpamDetected => "spam_detected",
            AuditKind::UnauthorizedAdminAttempt => "unauthorized_admin_attempt",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Actor the event is about, if known
    pub actor: Option<ActorId>,
    /// Administrator who performed the action, if any
    pub admin: Option<ActorId>,
    /// Event type
    pub kind: AuditKind,
    /// Free-form details, sorted by key
    pub details: BTreeMap<Cow<'static, str>, String>,
}

impl AuditEvent {
    /// Create an event without details.
    pub fn new(kind: AuditKind, actor: Option<ActorId>) -> Self {
        Self {
            actor,
            admin: None,
            kind,
            details: BTreeMap::new(),
        }
    }

    /// Attach the administrator responsible for the event.
    pub fn with_admin(mut self, admin: ActorId) -> Self {
        self.admin = Some(admin);
        self
    }

    /// Add one detail entry.
    pub fn with_detail(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.details.insert(Cow::Borrowed(key), value.into());
        self
    }

    /// Look up a detail value.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

/// Error reported by an audit sink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("audit sink failed: {0}")]
pub struct AuditError(pub String);
