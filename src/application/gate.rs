//! Admission orchestration.
//!
//! The gate runs every inbound event through the tiers in a fixed order and
//! stops at the first rejection:
//!
//! 1. no actor id: admit (fail-open)
//! 2. actor blocked: drop silently
//! 3. global throttle
//! 4. spam detector (text messages only); spam blocks the actor
//! 5. per-action limiter (when an action is named)
//!
//! Admins skip tiers 3-5 but are still subject to blocks.

use crate::application::blocklist::BlockRegistry;
use crate::application::global::GlobalThrottle;
use crate::application::janitor::{Janitor, JanitorConfig};
use crate::application::limiter::SlidingWindowLimiter;
use crate::application::metrics::Metrics;
use crate::application::ports::{AuditSink, Clock, StoreSet};
use crate::application::spam::SpamDetector;
use crate::domain::actor::ActorId;
use crate::domain::admin::AdminAllowlist;
use crate::domain::audit::{AuditEvent, AuditKind};
use crate::domain::decision::{Decision, SpamVerdict};
use crate::domain::fingerprint::MessageFingerprint;
use crate::domain::policy::PolicyTable;
use std::panic;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Single entry point for admission decisions.
///
/// Cloning is cheap; clones share stores, metrics and configuration.
pub struct SecurityGate<S: StoreSet> {
    blocks: BlockRegistry<S::Blocks>,
    global: GlobalThrottle<S::Counters>,
    spam: SpamDetector<S::Spam>,
    limiter: SlidingWindowLimiter<S::Requests>,
    admins: Arc<AdminAllowlist>,
    audit: Arc<dyn AuditSink>,
    metrics: Metrics,
    janitor_config: JanitorConfig,
}

impl<S: StoreSet> Clone for SecurityGate<S> {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks.clone(),
            global: self.global.clone(),
            spam: self.spam.clone(),
            limiter: self.limiter.clone(),
            admins: Arc::clone(&self.admins),
            audit: Arc::clone(&self.audit),
            metrics: self.metrics.clone(),
            janitor_config: self.janitor_config.clone(),
        }
    }
}

impl<S: StoreSet> SecurityGate<S> {
    /// Create a gate over a set of stores.
    ///
    /// Most callers should use
    /// [`SecurityGateBuilder`](crate::infrastructure::builder::SecurityGateBuilder)
    /// instead.
    pub fn new(
        stores: &S,
        clock: Arc<dyn Clock>,
        policies: PolicyTable,
        admins: AdminAllowlist,
        audit: Arc<dyn AuditSink>,
        janitor_config: JanitorConfig,
    ) -> Self {
        let global = GlobalThrottle::new(stores.counters(), clock.clone(), *policies.global());
        let spam = SpamDetector::new(stores.spam(), clock.clone(), *policies.spam());
        let blocks = BlockRegistry::new(stores.blocks(), clock.clone());
        let limiter = SlidingWindowLimiter::new(stores.requests(), clock, Arc::new(policies));

        Self {
            blocks,
            global,
            spam,
            limiter,
            admins: Arc::new(admins),
            audit,
            metrics: Metrics::new(),
            janitor_config,
        }
    }

    /// Decide whether an inbound event may proceed.
    ///
    /// # Arguments
    /// * `actor` - Sender of the event; `None` is admitted unconditionally
    /// * `action` - Rate-limited action the event maps to, if any
    /// * `text` - Message text, if the event is a text message
    ///
    /// Never fails and never blocks on I/O.
    pub fn evaluate(
        &self,
        actor: Option<ActorId>,
        action: Option<&str>,
        text: Option<&str>,
    ) -> Decision {
        let decision = match actor {
            Some(actor) => self.decide(actor, action, text),
            None => Decision::Admit,
        };

        self.metrics.record_decision(&decision);
        decision
    }

    fn decide(&self, actor: ActorId, action: Option<&str>, text: Option<&str>) -> Decision {
        if self.blocks.is_blocked(actor) {
            warn!(actor = %actor, "blocked actor attempted access");
            return Decision::RejectBlocked;
        }

        if self.admins.contains(actor) {
            return Decision::Admit;
        }

        if !self.global.allow(actor) {
            warn!(actor = %actor, "global rate limit exceeded");
            return Decision::RejectGlobalLimit {
                retry_after: self.global.policy().window(),
            };
        }

        if let Some(text) = text.filter(|t| !t.is_empty()) {
            let fingerprint = MessageFingerprint::of(Some(text));
            if let SpamVerdict::Spam(reason) = self.spam.check_fingerprint(actor, fingerprint) {
                let blocked_for = self.spam.policy().block_duration();
                warn!(actor = %actor, reason = %reason, "spam detected");
                self.blocks.block(actor, blocked_for);
                self.audit(
                    AuditEvent::new(AuditKind::SpamDetected, Some(actor))
                        .with_detail("reason", reason.as_str())
                        .with_detail("fingerprint", fingerprint.to_string())
                        .with_detail("blocked_for_secs", blocked_for.as_secs().to_string()),
                );
                return Decision::RejectSpam {
                    reason,
                    blocked_for,
                };
            }
        }

        if let Some(action) = action {
            if !self.limiter.allow(actor, action) {
                warn!(actor = %actor, action = action, "action rate limit exceeded");
                return Decision::RejectActionLimit {
                    action: action.into(),
                    retry_after: self.limiter.policies().action(action).window(),
                };
            }
        }

        Decision::Admit
    }

    /// Check that `actor` may run an admin command.
    ///
    /// Denials are logged and audited with the attempted command.
    pub fn authorize_admin(&self, actor: Option<ActorId>, command: Option<&str>) -> bool {
        if let Some(actor) = actor {
            if self.admins.contains(actor) {
                return true;
            }
        }

        warn!(actor = ?actor.map(|a| a.as_i64()), "unauthorized admin attempt");
        let mut event = AuditEvent::new(AuditKind::UnauthorizedAdminAttempt, actor);
        if let Some(command) = command {
            event = event.with_detail("command", command);
        }
        self.audit(event);
        false
    }

    /// Send an event to the audit sink, swallowing any failure.
    fn audit(&self, event: AuditEvent) {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| self.audit.record(&event)));

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(kind = %event.kind, error = %e, "failed to record audit event");
            }
            Err(_) => {
                error!(kind = %event.kind, "audit sink panicked while recording event");
            }
        }
    }

    /// Check if an actor is on the admin allowlist.
    pub fn is_admin(&self, actor: ActorId) -> bool {
        self.admins.contains(actor)
    }

    /// Check if an actor is currently blocked.
    pub fn is_blocked(&self, actor: ActorId) -> bool {
        self.blocks.is_blocked(actor)
    }

    /// Block an actor for `duration`, overwriting any existing block.
    pub fn block_actor(&self, actor: ActorId, duration: Duration) {
        self.blocks.block(actor, duration);
    }

    /// Lift an actor's block. Returns whether an active block was removed.
    pub fn unblock_actor(&self, actor: ActorId) -> bool {
        self.blocks.unblock(actor)
    }

    /// Create a janitor sweeping this gate's stores.
    pub fn janitor(&self) -> Janitor<S> {
        Janitor::new(
            self.limiter.clone(),
            self.global.clone(),
            self.spam.clone(),
            self.blocks.clone(),
            self.metrics.clone(),
            self.janitor_config.clone(),
        )
    }

    /// Get the policy table.
    pub fn policies(&self) -> &PolicyTable {
        self.limiter.policies()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get the per-action limiter.
    pub fn limiter(&self) -> &SlidingWindowLimiter<S::Requests> {
        &self.limiter
    }

    /// Get the global throttle.
    pub fn global_throttle(&self) -> &GlobalThrottle<S::Counters> {
        &self.global
    }

    /// Get the spam detector.
    pub fn spam_detector(&self) -> &SpamDetector<S::Spam> {
        &self.spam
    }

    /// Get the block registry.
    pub fn block_registry(&self) -> &BlockRegistry<S::Blocks> {
        &self.blocks
    }
}
