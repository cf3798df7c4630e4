//! Gate construction.
//!
//! Wires policies, stores, clock and audit sink into a
//! [`SecurityGate`], validating everything up front.

use crate::application::gate::SecurityGate;
use crate::application::janitor::{JanitorConfig, JanitorConfigError};
use crate::application::ports::{AuditSink, Clock, StoreSet};
use crate::domain::admin::AdminAllowlist;
use crate::domain::policy::{PolicyError, PolicyTable, RateLimit, SpamPolicy};
use crate::infrastructure::audit::TracingAuditSink;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::admin_allowlist_from_env;
use crate::infrastructure::storage::InMemoryStores;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Error returned when building a [`SecurityGate`] fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A rate limit or spam policy was invalid
    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),
    /// Janitor configuration validation failed
    #[error("janitor configuration error: {0}")]
    Janitor(#[from] JanitorConfigError),
}

/// Builder for constructing a [`SecurityGate`].
///
/// Raw limits passed to `with_global_limit` and `with_action_limit` are
/// validated when [`build`](Self::build) is called.
pub struct SecurityGateBuilder<S: StoreSet = InMemoryStores> {
    policies: PolicyTable,
    global_limit: Option<(usize, Duration)>,
    action_limits: Vec<(String, usize, Duration)>,
    admins: AdminAllowlist,
    clock: Option<Arc<dyn Clock>>,
    audit: Option<Arc<dyn AuditSink>>,
    stores: S,
    sweep_interval: Duration,
}

impl SecurityGateBuilder<InMemoryStores> {
    fn new() -> Self {
        Self {
            policies: PolicyTable::default(),
            global_limit: None,
            action_limits: Vec::new(),
            admins: AdminAllowlist::new(),
            clock: None,
            audit: None,
            stores: InMemoryStores::new(),
            sweep_interval: JanitorConfig::default().interval,
        }
    }
}

impl<S: StoreSet> SecurityGateBuilder<S> {
    /// Replace the whole policy table.
    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    /// Set the global per-actor limit.
    pub fn with_global_limit(mut self, limit: usize, window: Duration) -> Self {
        self.global_limit = Some((limit, window));
        self
    }

    /// Set or override the limit of one action.
    pub fn with_action_limit(
        mut self,
        action: impl Into<String>,
        limit: usize,
        window: Duration,
    ) -> Self {
        self.action_limits.push((action.into(), limit, window));
        self
    }

    /// Set the spam detection policy.
    pub fn with_spam_policy(mut self, spam: SpamPolicy) -> Self {
        self.policies = self.policies.with_spam(spam);
        self
    }

    /// Set the admin allowlist.
    pub fn with_admins(mut self, admins: AdminAllowlist) -> Self {
        self.admins = admins;
        self
    }

    /// Load the admin allowlist from the `ADMIN_IDS` environment variable.
    pub fn with_admins_from_env(mut self) -> Self {
        self.admins = admin_allowlist_from_env();
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the audit sink.
    ///
    /// Default: [`TracingAuditSink`]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Set how often the janitor sweeps.
    ///
    /// Default: 30 minutes
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Use a different set of stores.
    pub fn with_stores<T: StoreSet>(self, stores: T) -> SecurityGateBuilder<T> {
        SecurityGateBuilder {
            policies: self.policies,
            global_limit: self.global_limit,
            action_limits: self.action_limits,
            admins: self.admins,
            clock: self.clock,
            audit: self.audit,
            stores,
            sweep_interval: self.sweep_interval,
        }
    }

    /// Build the gate.
    ///
    /// # Errors
    /// Returns `BuildError` if a limit or the sweep interval is invalid.
    pub fn build(self) -> Result<SecurityGate<S>, BuildError> {
        let mut policies = self.policies;

        if let Some((limit, window)) = self.global_limit {
            policies = policies.with_global(RateLimit::new(limit, window)?);
        }
        for (action, limit, window) in self.action_limits {
            policies = policies.with_action(action, RateLimit::new(limit, window)?);
        }

        let janitor_config = JanitorConfig::new(self.sweep_interval)?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let audit = self.audit.unwrap_or_else(|| Arc::new(TracingAuditSink::new()));

        info!(
            admins = self.admins.len(),
            global_limit = policies.global().limit(),
            global_window_secs = policies.global().window().as_secs(),
            "security gate configured"
        );

        Ok(SecurityGate::new(
            &self.stores,
            clock,
            policies,
            self.admins,
            audit,
            janitor_config,
        ))
    }
}

impl SecurityGate<InMemoryStores> {
    /// Create a builder for configuring the gate.
    ///
    /// Defaults:
    /// - Policies: [`PolicyTable::default`]
    /// - Admins: none
    /// - Clock: [`SystemClock`]
    /// - Audit sink: [`TracingAuditSink`]
    /// - Stores: [`InMemoryStores`]
    /// - Sweep interval: 30 minutes
    pub fn builder() -> SecurityGateBuilder<InMemoryStores> {
        SecurityGateBuilder::new()
    }
}
