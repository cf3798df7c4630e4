//! Actor identity and rate-limited action classes.
//!
//! An actor is the calling principal (a chat user). Actions are the command
//! classes that carry their own rate limiting policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of the principal issuing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
    /// Wrap a raw numeric identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw numeric identifier.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ActorId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Built-in action classes with a dedicated policy.
///
/// Any other action name is still accepted by the limiter and falls back to
/// the default policy of the [`PolicyTable`](crate::domain::policy::PolicyTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Recording a transaction
    Transaction,
    /// Daily/weekly/monthly reports
    Month,
    /// Transaction history listing
    History,
    /// Plan upgrade request
    Upgrade,
    /// Photo upload (payment proof)
    Photo,
    /// Session start
    Start,
    /// Transaction deletion
    Delete,
}

impl Action {
    /// All built-in actions.
    pub const ALL: [Action; 7] = [
        Action::Transaction,
        Action::Month,
        Action::History,
        Action::Upgrade,
        Action::Photo,
        Action::Start,
        Action::Delete,
    ];

    /// Name used as the key in the policy table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::Transaction => "transaction",
            Action::Month => "month",
            Action::History => "history",
            Action::Upgrade => "upgrade",
            Action::Photo => "photo",
            Action::Start => "start",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Key of one per-action request log: an actor and the action name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey {
    /// Actor issuing the request
    pub actor: ActorId,
    /// Action name as passed by the caller
    pub action: Box<str>,
}

impl ActionKey {
    /// Create a key for an actor/action pair.
    pub fn new(actor: ActorId, action: &str) -> Self {
        Self {
            actor,
            action: action.into(),
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.actor, self.action)
    }
}
