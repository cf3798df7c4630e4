//! Rate limiting and spam policies.
//!
//! Policies are static configuration: they are loaded once at startup and
//! never change while the gate is running. All policy types deserialize from
//! a representation with windows in milliseconds, and reject zero limits or
//! zero windows at construction time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::actor::Action;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Error returned when a policy is constructed with invalid parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Request limit must be greater than zero
    #[error("limit must be greater than 0")]
    ZeroLimit,
    /// Window duration must be greater than zero
    #[error("window must be greater than 0")]
    ZeroWindow,
    /// Spam block duration must be greater than zero
    #[error("block duration must be greater than 0")]
    ZeroBlockDuration,
}

/// At most `limit` requests per `window`.
///
/// Used both for per-action limits (sliding window) and for the global tier
/// (fixed window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RateLimitRepr", into = "RateLimitRepr")]
pub struct RateLimit {
    limit: usize,
    window: Duration,
}

impl RateLimit {
    /// Create a rate limit.
    ///
    /// # Errors
    /// Returns `PolicyError::ZeroLimit` or `PolicyError::ZeroWindow` if either
    /// parameter is zero.
    pub fn new(limit: usize, window: Duration) -> Result<Self, PolicyError> {
        if limit == 0 {
            return Err(PolicyError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        Ok(Self { limit, window })
    }

    /// `limit` requests per minute.
    pub fn per_minute(limit: usize) -> Result<Self, PolicyError> {
        Self::new(limit, MINUTE)
    }

    /// `limit` requests per hour.
    pub fn per_hour(limit: usize) -> Result<Self, PolicyError> {
        Self::new(limit, HOUR)
    }

    /// Maximum number of requests in one window.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Window duration.
    pub fn window(&self) -> Duration {
        self.window
    }

    // Only for the built-in constants below, which are known to be valid.
    const fn fixed(limit: usize, window: Duration) -> Self {
        Self { limit, window }
    }
}

#[derive(Serialize, Deserialize)]
struct RateLimitRepr {
    limit: usize,
    window_ms: u64,
}

impl TryFrom<RateLimitRepr> for RateLimit {
    type Error = PolicyError;

    fn try_from(repr: RateLimitRepr) -> Result<Self, Self::Error> {
        RateLimit::new(repr.limit, Duration::from_millis(repr.window_ms))
    }
}

impl From<RateLimit> for RateLimitRepr {
    fn from(limit: RateLimit) -> Self {
        Self {
            limit: limit.limit,
            window_ms: duration_to_ms(limit.window),
        }
    }
}

/// Thresholds for the spam detector and the punishment it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpamPolicyRepr", into = "SpamPolicyRepr")]
pub struct SpamPolicy {
    max_similar_messages: usize,
    max_messages_per_window: usize,
    window: Duration,
    block_duration: Duration,
}

impl SpamPolicy {
    /// Create a spam policy.
    ///
    /// # Arguments
    /// * `max_similar_messages` - Identical messages tolerated within the window
    /// * `max_messages_per_window` - Total messages tolerated within the window
    /// * `window` - Length of the trailing observation window
    /// * `block_duration` - How long an actor is blocked once flagged
    ///
    /// # Errors
    /// Returns a `PolicyError` if any threshold or duration is zero.
    pub fn new(
        max_similar_messages: usize,
        max_messages_per_window: usize,
        window: Duration,
        block_duration: Duration,
    ) -> Result<Self, PolicyError> {
        if max_similar_messages == 0 || max_messages_per_window == 0 {
            return Err(PolicyError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(PolicyError::ZeroWindow);
        }
        if block_duration.is_zero() {
            return Err(PolicyError::ZeroBlockDuration);
        }
        Ok(Self {
            max_similar_messages,
            max_messages_per_window,
            window,
            block_duration,
        })
    }

    /// Identical messages tolerated within the window.
    pub fn max_similar_messages(&self) -> usize {
        self.max_similar_messages
    }

    /// Total messages tolerated within the window.
    pub fn max_messages_per_window(&self) -> usize {
        self.max_messages_per_window
    }

    /// Observation window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Block duration applied to flagged actors.
    pub fn block_duration(&self) -> Duration {
        self.block_duration
    }
}

impl Default for SpamPolicy {
    fn default() -> Self {
        Self {
            max_similar_messages: 5,
            max_messages_per_window: 30,
            window: MINUTE,
            block_duration: Duration::from_secs(300),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SpamPolicyRepr {
    max_similar_messages: usize,
    max_messages_per_window: usize,
    window_ms: u64,
    block_duration_ms: u64,
}

impl TryFrom<SpamPolicyRepr> for SpamPolicy {
    type Error = PolicyError;

    fn try_from(repr: SpamPolicyRepr) -> Result<Self, Self::Error> {
        SpamPolicy::new(
            repr.max_similar_messages,
            repr.max_messages_per_window,
            Duration::from_millis(repr.window_ms),
            Duration::from_millis(repr.block_duration_ms),
        )
    }
}

impl From<SpamPolicy> for SpamPolicyRepr {
    fn from(policy: SpamPolicy) -> Self {
        Self {
            max_similar_messages: policy.max_similar_messages,
            max_messages_per_window: policy.max_messages_per_window,
            window_ms: duration_to_ms(policy.window),
            block_duration_ms: duration_to_ms(policy.block_duration),
        }
    }
}

fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Complete policy configuration of the gate.
///
/// Missing fields fall back to the built-in defaults when deserializing, so a
/// configuration file only needs to list what it overrides.
///
/// # Example
/// ```
/// use abuse_guard::{PolicyTable, RateLimit};
///
/// let table = PolicyTable::default()
///     .with_action("export", RateLimit::per_hour(2).unwrap());
///
/// assert_eq!(table.action("export").limit(), 2);
/// assert_eq!(table.action("upgrade").limit(), 3);
/// // Unknown actions use the default policy
/// assert_eq!(table.action("unknown").limit(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    actions: HashMap<String, RateLimit>,
    default_action: RateLimit,
    global: RateLimit,
    spam: SpamPolicy,
}

impl PolicyTable {
    /// Policy for an action name, or the default policy if the name is unknown.
    pub fn action(&self, name: &str) -> &RateLimit {
        self.actions.get(name).unwrap_or(&self.default_action)
    }

    /// Whether the action name has a dedicated policy.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Policy applied to unrecognized actions.
    pub fn default_action(&self) -> &RateLimit {
        &self.default_action
    }

    /// Combined per-actor limit across all actions.
    pub fn global(&self) -> &RateLimit {
        &self.global
    }

    /// Spam detection thresholds.
    pub fn spam(&self) -> &SpamPolicy {
        &self.spam
    }

    /// Longest window among all action policies.
    pub fn longest_action_window(&self) -> Duration {
        self.actions
            .values()
            .map(RateLimit::window)
            .chain(std::iter::once(self.default_action.window))
            .max()
            .unwrap_or(self.default_action.window)
    }

    /// Set or replace the policy of one action.
    pub fn with_action(mut self, name: impl Into<String>, limit: RateLimit) -> Self {
        self.actions.insert(name.into(), limit);
        self
    }

    /// Set the policy for unrecognized actions.
    pub fn with_default_action(mut self, limit: RateLimit) -> Self {
        self.default_action = limit;
        self
    }

    /// Set the global limit.
    pub fn with_global(mut self, limit: RateLimit) -> Self {
        self.global = limit;
        self
    }

    /// Set the spam policy.
    pub fn with_spam(mut self, spam: SpamPolicy) -> Self {
        self.spam = spam;
        self
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        let actions = Action::ALL
            .into_iter()
            .map(|action| {
                let limit = match action {
                    Action::Transaction => RateLimit::fixed(20, HOUR),
                    Action::Month => RateLimit::fixed(5, MINUTE),
                    Action::History => RateLimit::fixed(10, MINUTE),
                    Action::Upgrade => RateLimit::fixed(3, HOUR),
                    Action::Photo => RateLimit::fixed(5, HOUR),
                    Action::Start => RateLimit::fixed(5, MINUTE),
                    Action::Delete => RateLimit::fixed(10, MINUTE),
                };
                (action.as_str().to_string(), limit)
            })
            .collect();

        Self {
            actions,
            default_action: RateLimit::fixed(30, MINUTE),
            global: RateLimit::fixed(60, MINUTE),
            spam: SpamPolicy::default(),
        }
    }
}
