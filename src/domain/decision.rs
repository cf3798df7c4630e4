//! Admission decisions and spam verdicts.

use std::fmt;
use std::time::Duration;

/// Why a message was classified as spam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpamReason {
    /// The same text was sent too many times within the window
    RepeatedMessage,
    /// Too many messages of any content within the window
    Flood,
}

impl SpamReason {
    /// Stable name used in logs and audit details.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SpamReason::RepeatedMessage => "repeated_message",
            SpamReason::Flood => "flood",
        }
    }
}

impl fmt::Display for SpamReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a spam check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    /// Message accepted and recorded
    Clean,
    /// Message rejected, nothing recorded
    Spam(SpamReason),
}

impl SpamVerdict {
    /// Check if this verdict flags spam.
    pub fn is_spam(&self) -> bool {
        matches!(self, SpamVerdict::Spam(_))
    }

    /// The spam reason, if any.
    pub fn reason(&self) -> Option<SpamReason> {
        match self {
            SpamVerdict::Clean => None,
            SpamVerdict::Spam(reason) => Some(*reason),
        }
    }
}

/// Outcome of evaluating one inbound event.
///
/// Rejections carry the duration the caller can use to tell the user how long
/// to wait. `RejectBlocked` deliberately carries nothing: blocked actors get
/// no feedback at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Pass the event on to the next handler
    Admit,
    /// Actor is currently blocked; drop silently
    RejectBlocked,
    /// Combined per-actor limit exceeded
    RejectGlobalLimit {
        /// Window of the global limit
        retry_after: Duration,
    },
    /// Message flagged as spam; the actor has been blocked
    RejectSpam {
        /// What triggered the detector
        reason: SpamReason,
        /// How long the actor is blocked
        blocked_for: Duration,
    },
    /// Per-action limit exceeded
    RejectActionLimit {
        /// Action that was throttled
        action: Box<str>,
        /// Window of the action's limit
        retry_after: Duration,
    },
}

impl Decision {
    /// Check if the event was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admit)
    }

    /// Check if the event was rejected for any reason.
    pub fn is_rejected(&self) -> bool {
        !self.is_admitted()
    }

    /// Short name of the state the event ended in.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Admit => "admitted",
            Decision::RejectBlocked => "blocked",
            Decision::RejectGlobalLimit { .. } => "global_limited",
            Decision::RejectSpam { .. } => "spam_blocked",
            Decision::RejectActionLimit { .. } => "action_limited",
        }
    }

    /// Human-readable wait time, rounded up to whole minutes.
    ///
    /// Returns `None` for admitted events and silent rejections.
    pub fn wait_hint(&self) -> Option<String> {
        let wait = match self {
            Decision::Admit | Decision::RejectBlocked => return None,
            Decision::RejectGlobalLimit { retry_after } => *retry_after,
            Decision::RejectSpam { blocked_for, .. } => *blocked_for,
            Decision::RejectActionLimit { retry_after, .. } => *retry_after,
        };
        Some(format_minutes(wait))
    }

    /// Message to show the user, if the rejection is not silent.
    pub fn notice(&self) -> Option<String> {
        match self {
            Decision::Admit | Decision::RejectBlocked => None,
            Decision::RejectGlobalLimit { retry_after }
            | Decision::RejectActionLimit { retry_after, .. } => Some(format!(
                "Too many requests. Please wait {}.",
                format_minutes(*retry_after)
            )),
            Decision::RejectSpam { .. } => Some(
                "Suspicious activity detected. You have been temporarily blocked.".to_string(),
            ),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn format_minutes(wait: Duration) -> String {
    let minutes = wait.as_secs().div_ceil(60).max(1);
    if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{} minutes", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_hint_rounds_up() {
        let decision = Decision::RejectActionLimit {
            action: "month".into(),
            retry_after: Duration::from_secs(90),
        };
        assert_eq!(decision.wait_hint().as_deref(), Some("2 minutes"));
    }

    #[test]
    fn test_wait_hint_never_below_one_minute() {
        let decision = Decision::RejectGlobalLimit {
            retry_after: Duration::from_millis(500),
        };
        assert_eq!(decision.wait_hint().as_deref(), Some("1 minute"));
    }

    #[test]
    fn test_hourly_action_notice() {
        let decision = Decision::RejectActionLimit {
            action: "upgrade".into(),
            retry_after: Duration::from_secs(3600),
        };
        assert_eq!(
            decision.notice().as_deref(),
            Some("Too many requests. Please wait 60 minutes.")
        );
    }

    #[test]
    fn test_blocked_is_silent() {
        assert_eq!(Decision::RejectBlocked.notice(), None);
        assert_eq!(Decision::RejectBlocked.wait_hint(), None);
        assert!(Decision::RejectBlocked.is_rejected());
    }

    #[test]
    fn test_admit_has_no_notice() {
        assert!(Decision::Admit.is_admitted());
        assert_eq!(Decision::Admit.notice(), None);
    }

    #[test]
    fn test_spam_notice_and_hint() {
        let decision = Decision::RejectSpam {
            reason: SpamReason::Flood,
            blocked_for: Duration::from_secs(300),
        };
        assert!(decision.notice().unwrap().contains("temporarily blocked"));
        assert_eq!(decision.wait_hint().as_deref(), Some("5 minutes"));
        assert_eq!(decision.to_string(), "spam_blocked");
    }

    #[test]
    fn test_spam_verdict_accessors() {
        assert!(!SpamVerdict::Clean.is_spam());
        assert_eq!(SpamVerdict::Clean.reason(), None);

        let verdict = SpamVerdict::Spam(SpamReason::RepeatedMessage);
        assert!(verdict.is_spam());
        assert_eq!(verdict.reason(), Some(SpamReason::RepeatedMessage));
        assert_eq!(SpamReason::RepeatedMessage.to_string(), "repeated_message");
    }
}
