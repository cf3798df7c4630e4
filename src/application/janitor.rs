//! Periodic eviction of stale limiter state.
//!
//! Every store evicts lazily on access, so a sweep never changes an admission
//! decision. It only bounds memory for actors that went quiet.

use crate::application::blocklist::BlockRegistry;
use crate::application::global::GlobalThrottle;
use crate::application::limiter::SlidingWindowLimiter;
use crate::application::metrics::Metrics;
use crate::application::ports::StoreSet;
use crate::application::spam::SpamDetector;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "async")]
use tokio::sync::oneshot;
#[cfg(feature = "async")]
use tokio::task::JoinHandle;
#[cfg(feature = "async")]
use tokio::time::{interval, MissedTickBehavior};

/// Error returned when janitor configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JanitorConfigError {
    /// Sweep interval duration must be greater than zero
    #[error("sweep interval must be greater than 0")]
    ZeroSweepInterval,
}

/// Configuration for the janitor.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// How often to sweep
    pub interval: Duration,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30 * 60),
        }
    }
}

impl JanitorConfig {
    /// Create a janitor config with the specified interval.
    ///
    /// # Errors
    /// Returns `JanitorConfigError::ZeroSweepInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, JanitorConfigError> {
        if interval.is_zero() {
            return Err(JanitorConfigError::ZeroSweepInterval);
        }
        Ok(Self { interval })
    }
}

/// Entries removed by one sweep, per store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Empty per-action request logs
    pub request_logs: usize,
    /// Global counters whose window elapsed
    pub global_counters: usize,
    /// Empty spam records
    pub spam_records: usize,
    /// Expired blocks
    pub blocks: usize,
}

impl SweepReport {
    /// Total entries removed.
    pub fn total(&self) -> usize {
        self.request_logs + self.global_counters + self.spam_records + self.blocks
    }
}

/// Sweeps the gate's stores on demand or on a timer.
pub struct Janitor<S: StoreSet> {
    limiter: SlidingWindowLimiter<S::Requests>,
    global: GlobalThrottle<S::Counters>,
    spam: SpamDetector<S::Spam>,
    blocks: BlockRegistry<S::Blocks>,
    metrics: Metrics,
    config: JanitorConfig,
}

impl<S: StoreSet> Janitor<S> {
    /// Create a janitor over the given components.
    ///
    /// Usually obtained from [`SecurityGate::janitor`](crate::application::gate::SecurityGate::janitor).
    pub fn new(
        limiter: SlidingWindowLimiter<S::Requests>,
        global: GlobalThrottle<S::Counters>,
        spam: SpamDetector<S::Spam>,
        blocks: BlockRegistry<S::Blocks>,
        metrics: Metrics,
        config: JanitorConfig,
    ) -> Self {
        Self {
            limiter,
            global,
            spam,
            blocks,
            metrics,
            config,
        }
    }

    /// Run one sweep over every store.
    pub fn sweep(&self) -> SweepReport {
        let report = SweepReport {
            request_logs: self.limiter.evict_expired(),
            global_counters: self.global.evict_expired(),
            spam_records: self.spam.evict_expired(),
            blocks: self.blocks.evict_expired(),
        };

        self.metrics.record_evictions(report.total());
        debug!(
            request_logs = report.request_logs,
            global_counters = report.global_counters,
            spam_records = report.spam_records,
            blocks = report.blocks,
            "janitor sweep finished"
        );

        report
    }

    /// Get the janitor configuration.
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }
}

#[cfg(feature = "async")]
impl<S> Janitor<S>
where
    S: StoreSet + 'static,
{
    /// Start sweeping periodically on the current tokio runtime.
    ///
    /// The first sweep runs one full interval after the call.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn start(self) -> JanitorHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        debug!("janitor shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.sweep();
                    }
                }
            }
        });

        JanitorHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }
}

/// Error returned when the janitor task did not stop cleanly.
#[cfg(feature = "async")]
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    /// The task panicked or was cancelled
    #[error("janitor task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Handle to a running janitor task.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) stops the
/// task at its next wakeup.
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct JanitorHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

#[cfg(feature = "async")]
impl JanitorHandle {
    /// Stop the janitor and wait for the task to finish.
    ///
    /// A sweep already in progress runs to completion first.
    pub async fn shutdown(mut self) -> Result<(), ShutdownError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already be gone; the join below reports why
            let _ = tx.send(());
        }
        (&mut self.task).await?;
        Ok(())
    }

    /// Check if the task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gate::SecurityGate;
    use crate::domain::actor::ActorId;
    use crate::domain::admin::AdminAllowlist;
    use crate::domain::policy::PolicyTable;
    use crate::infrastructure::mocks::{MockClock, RecordingAuditSink};
    use crate::infrastructure::storage::InMemoryStores;
    use std::sync::Arc;
    use std::time::Instant;

    fn gate(config: JanitorConfig) -> (SecurityGate<InMemoryStores>, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let gate = SecurityGate::new(
            &InMemoryStores::new(),
            clock.clone(),
            PolicyTable::default(),
            AdminAllowlist::new(),
            Arc::new(RecordingAuditSink::new()),
            config,
        );
        (gate, clock)
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(
            JanitorConfig::new(Duration::ZERO).unwrap_err(),
            JanitorConfigError::ZeroSweepInterval
        );
        assert_eq!(
            JanitorConfig::default().interval,
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn test_sweep_on_fresh_state_removes_nothing() {
        let (gate, _clock) = gate(JanitorConfig::default());
        let actor = ActorId::new(1);

        gate.evaluate(Some(actor), Some("start"), Some("hi"));
        gate.block_actor(ActorId::new(2), Duration::from_secs(60));

        let report = gate.janitor().sweep();
        assert_eq!(report, SweepReport::default());
        assert_eq!(gate.limiter().len(), 1);
        assert_eq!(gate.global_throttle().len(), 1);
        assert_eq!(gate.spam_detector().len(), 1);
        assert_eq!(gate.block_registry().len(), 1);
    }

    #[test]
    fn test_sweep_clears_stale_state() {
        let (gate, clock) = gate(JanitorConfig::default());

        for id in 0..10 {
            gate.evaluate(Some(ActorId::new(id)), Some("upgrade"), Some("hello"));
        }
        gate.block_actor(ActorId::new(99), Duration::from_secs(300));

        // Longer than every window in the default table
        clock.advance(Duration::from_secs(3601));

        let report = gate.janitor().sweep();
        assert_eq!(report.request_logs, 10);
        assert_eq!(report.global_counters, 10);
        assert_eq!(report.spam_records, 10);
        assert_eq!(report.blocks, 1);
        assert_eq!(report.total(), 31);
        assert_eq!(gate.metrics().entries_evicted(), 31);

        assert!(gate.limiter().is_empty());
        assert!(gate.global_throttle().is_empty());
        assert!(gate.spam_detector().is_empty());
        assert!(gate.block_registry().is_empty());
    }

    #[test]
    fn test_sweep_respects_per_action_windows() {
        let (gate, clock) = gate(JanitorConfig::default());
        let actor = ActorId::new(1);

        gate.evaluate(Some(actor), Some("start"), None);
        gate.evaluate(Some(actor), Some("upgrade"), None);
        clock.advance(Duration::from_secs(120));

        // "start" has a one minute window, "upgrade" one hour
        let report = gate.janitor().sweep();
        assert_eq!(report.request_logs, 1);
        assert_eq!(gate.limiter().remaining(actor, "upgrade"), 2);
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_start_and_shutdown() {
        let config = JanitorConfig::new(Duration::from_secs(10)).unwrap();
        let (gate, clock) = gate(config);

        gate.evaluate(Some(ActorId::new(1)), Some("start"), Some("hi"));
        clock.advance(Duration::from_secs(3601));

        let handle = gate.janitor().start();
        assert!(!handle.is_finished());

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(gate.limiter().is_empty());
        assert!(gate.spam_detector().is_empty());

        handle.shutdown().await.unwrap();
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_no_sweep_before_first_interval() {
        let config = JanitorConfig::new(Duration::from_secs(10)).unwrap();
        let (gate, clock) = gate(config);

        gate.evaluate(Some(ActorId::new(1)), Some("start"), None);
        clock.advance(Duration::from_secs(3601));

        let handle = gate.janitor().start();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(gate.limiter().len(), 1);

        handle.shutdown().await.unwrap();
        assert_eq!(gate.limiter().len(), 1);
    }
}
