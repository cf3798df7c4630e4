//! Spam and flood detection.
//!
//! Keeps a trailing window of message fingerprints per actor. A message is
//! flagged when, counting itself, it would be the `max_similar_messages`-th
//! copy of the same normalized text in the window, or the
//! `max_messages_per_window`-th message overall. Flagged messages are not
//! recorded. The detector only classifies; blocking is up to the caller.

use crate::application::ports::{Clock, Storage};
use crate::domain::actor::ActorId;
use crate::domain::decision::{SpamReason, SpamVerdict};
use crate::domain::fingerprint::MessageFingerprint;
use crate::domain::policy::SpamPolicy;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Recent messages of one actor, oldest first.
#[derive(Debug, Clone)]
pub struct SpamRecord {
    messages: VecDeque<(MessageFingerprint, Instant)>,
    last_message: Instant,
}

impl SpamRecord {
    /// Create an empty record.
    pub fn new(now: Instant) -> Self {
        Self {
            messages: VecDeque::new(),
            last_message: now,
        }
    }

    /// Drop messages older than the window.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&(_, sent)) = self.messages.front() {
            if now.saturating_duration_since(sent) >= window {
                self.messages.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of messages in the record carrying `fingerprint`.
    pub fn count_matching(&self, fingerprint: MessageFingerprint) -> usize {
        self.messages
            .iter()
            .filter(|(fp, _)| *fp == fingerprint)
            .count()
    }

    /// Append an accepted message.
    pub fn record(&mut self, fingerprint: MessageFingerprint, now: Instant) {
        self.messages.push_back((fingerprint, now));
        self.last_message = now;
    }

    /// When the last accepted message arrived.
    pub fn last_message(&self) -> Instant {
        self.last_message
    }

    /// Number of messages in the record.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the record holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Per-actor duplicate and flood detector.
#[derive(Clone)]
pub struct SpamDetector<S>
where
    S: Storage<ActorId, SpamRecord> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    policy: SpamPolicy,
}

impl<S> SpamDetector<S>
where
    S: Storage<ActorId, SpamRecord> + Clone,
{
    /// Create a detector enforcing `policy`.
    pub fn new(storage: S, clock: Arc<dyn Clock>, policy: SpamPolicy) -> Self {
        Self {
            storage,
            clock,
            policy,
        }
    }

    /// Classify a message from `actor`.
    ///
    /// Repeated text is checked before overall volume, so an actor that
    /// trips both thresholds at once is reported as
    /// [`SpamReason::RepeatedMessage`].
    pub fn check(&self, actor: ActorId, text: Option<&str>) -> SpamVerdict {
        self.check_fingerprint(actor, MessageFingerprint::of(text))
    }

    /// Classify a message that has already been fingerprinted.
    pub fn check_fingerprint(
        &self,
        actor: ActorId,
        fingerprint: MessageFingerprint,
    ) -> SpamVerdict {
        let now = self.clock.now();
        let policy = self.policy;

        self.storage
            .with_entry_mut(actor, || SpamRecord::new(now), |record| {
                record.prune(now, policy.window());

                if record.count_matching(fingerprint) + 1 >= policy.max_similar_messages() {
                    return SpamVerdict::Spam(SpamReason::RepeatedMessage);
                }
                if record.len() + 1 >= policy.max_messages_per_window() {
                    return SpamVerdict::Spam(SpamReason::Flood);
                }

                record.record(fingerprint, now);
                SpamVerdict::Clean
            })
    }

    /// Prune every record and remove the ones left empty.
    ///
    /// Returns the number of records removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.policy.window();
        let mut removed = 0;

        self.storage.retain(|_, record| {
            record.prune(now, window);
            let keep = !record.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Messages currently recorded for an actor.
    pub fn recorded(&self, actor: ActorId) -> usize {
        self.storage
            .with_existing(&actor, SpamRecord::len)
            .unwrap_or(0)
    }

    /// Number of tracked actors.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no actors are tracked.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get the enforced policy.
    pub fn policy(&self) -> &SpamPolicy {
        &self.policy
    }
}
