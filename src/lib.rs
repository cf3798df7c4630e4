//! # abuse-guard
//!
//! In-process abuse prevention for chat-style services.
//!
//! Every inbound event goes through a [`SecurityGate`] before any business
//! logic runs. The gate combines four tiers and stops at the first one that
//! rejects:
//!
//! 1. **Blocks**: actors blocked for spam (or by an operator) are dropped silently
//! 2. **Global throttle**: a fixed-window cap on everything one actor sends
//! 3. **Spam detection**: repeated identical messages or message floods
//! 4. **Per-action limits**: sliding windows per (actor, action) pair
//!
//! Administrators skip tiers 2-4 but can still be blocked.
//!
//! ## Quick Start
//!
//! ```rust
//! use abuse_guard::{ActorId, Decision, SecurityGate};
//!
//! let gate = SecurityGate::builder().build().unwrap();
//! let actor = Some(ActorId::new(42));
//!
//! match gate.evaluate(actor, Some("upgrade"), None) {
//!     Decision::Admit => { /* run the handler */ }
//!     Decision::RejectBlocked => { /* drop silently */ }
//!     rejected => {
//!         if let Some(notice) = rejected.notice() {
//!             println!("{}", notice);
//!         }
//!     }
//! }
//! ```
//!
//! ## Policies
//!
//! Limits live in a [`PolicyTable`]. The defaults are:
//!
//! | Action | Limit |
//! |--------|-------|
//! | `transaction` | 20 per hour |
//! | `month` | 5 per minute |
//! | `history` | 10 per minute |
//! | `upgrade` | 3 per hour |
//! | `photo` | 5 per hour |
//! | `start` | 5 per minute |
//! | `delete` | 10 per minute |
//! | anything else | 30 per minute |
//! | global (all actions) | 60 per minute |
//!
//! Spam: 5 identical messages or 30 messages of any kind within 60 seconds
//! trigger a 5 minute block.
//!
//! Tables can be customized in code or deserialized with `serde` (windows
//! are given in milliseconds):
//!
//! ```rust
//! use abuse_guard::{PolicyTable, RateLimit};
//! use std::time::Duration;
//!
//! let table = PolicyTable::default()
//!     .with_action("export", RateLimit::new(2, Duration::from_secs(600)).unwrap())
//!     .with_global(RateLimit::per_minute(120).unwrap());
//!
//! assert_eq!(table.action("export").limit(), 2);
//! assert_eq!(table.action("unknown").limit(), 30);
//! ```
//!
//! ## Administrators
//!
//! The admin allowlist is usually loaded from the `ADMIN_IDS` environment
//! variable (comma-separated ids, invalid entries skipped):
//!
//! ```rust
//! use abuse_guard::{ActorId, AdminAllowlist, SecurityGate};
//!
//! let gate = SecurityGate::builder()
//!     .with_admins(AdminAllowlist::parse("1001,1002"))
//!     .build()
//!     .unwrap();
//!
//! assert!(gate.authorize_admin(Some(ActorId::new(1001)), Some("/stats")));
//! // Denied attempts are logged and audited
//! assert!(!gate.authorize_admin(Some(ActorId::new(7)), Some("/stats")));
//! ```
//!
//! ## Auditing
//!
//! Spam blocks and denied admin commands are sent to an [`AuditSink`]. The
//! default [`TracingAuditSink`] emits them as `WARN` events on the
//! `abuse_guard::audit` target. Sink failures are logged and never change a
//! decision.
//!
//! ## Memory Management
//!
//! All stores evict lazily on access, so stale state never affects a
//! decision. To bound memory for actors that went quiet, run the
//! [`Janitor`] on a timer (requires the `async` feature):
//!
//! ```rust,no_run
//! # use abuse_guard::SecurityGate;
//! # async fn run() {
//! let gate = SecurityGate::builder().build().unwrap();
//! let janitor = gate.janitor().start();
//!
//! // ... serve traffic ...
//!
//! janitor.shutdown().await.unwrap();
//! # }
//! ```
//!
//! ## Input Hygiene
//!
//! [`sanitize_input`] trims, truncates to 500 characters and strips control
//! characters and HTML-like tags from user text:
//!
//! ```rust
//! use abuse_guard::sanitize_input;
//!
//! assert_eq!(sanitize_input("  <b>hi</b>\u{0007} "), "hi");
//! ```
//!
//! ## Observability
//!
//! ```rust
//! # use abuse_guard::SecurityGate;
//! # let gate = SecurityGate::builder().build().unwrap();
//! let snapshot = gate.metrics().snapshot();
//! println!("Admitted: {}", snapshot.admitted);
//! println!("Rejection rate: {:.2}%", snapshot.rejection_rate() * 100.0);
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    actor::{Action, ActionKey, ActorId, UnknownAction},
    admin::AdminAllowlist,
    audit::{AuditError, AuditEvent, AuditKind},
    decision::{Decision, SpamReason, SpamVerdict},
    fingerprint::MessageFingerprint,
    policy::{PolicyError, PolicyTable, RateLimit, SpamPolicy},
    sanitize::{sanitize_input, MAX_INPUT_CHARS},
};

pub use application::{
    blocklist::{BlockEntry, BlockRegistry},
    gate::SecurityGate,
    global::{GlobalCounter, GlobalThrottle},
    janitor::{Janitor, JanitorConfig, JanitorConfigError, SweepReport},
    limiter::{RequestLog, SlidingWindowLimiter},
    metrics::{Metrics, MetricsSnapshot},
    ports::{AuditSink, Clock, Storage, StoreSet},
    spam::{SpamDetector, SpamRecord},
};

#[cfg(feature = "async")]
pub use application::janitor::{JanitorHandle, ShutdownError};

pub use infrastructure::{
    audit::TracingAuditSink,
    builder::{BuildError, SecurityGateBuilder},
    clock::SystemClock,
    config::{admin_allowlist_from_env, ADMIN_IDS_ENV},
    storage::{InMemoryStores, ShardedStorage},
};
