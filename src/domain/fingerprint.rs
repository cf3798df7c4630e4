//! Message fingerprinting for duplicate detection.
//!
//! A fingerprint identifies a message by its literal text, after trimming
//! surrounding whitespace and lower-casing. Two messages with equal
//! normalized text always share a fingerprint.
//!
//! Fingerprints are 64-bit non-cryptographic hashes. Distinct texts can
//! collide, in which case they count as the same message for spam purposes.
//! This is a known source of false positives and is accepted for an abuse
//! heuristic.

use ahash::AHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Digest of a normalized message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageFingerprint(u64);

impl MessageFingerprint {
    /// Compute the fingerprint of a message.
    ///
    /// `None` is fingerprinted as the empty string, so text-less events from
    /// one actor all share a fingerprint.
    ///
    /// # Performance
    /// Uses ahash with fixed keys, which keeps results stable for the whole
    /// process lifetime. Normalization allocates only when the text contains
    /// upper-case characters.
    pub fn of(text: Option<&str>) -> Self {
        let trimmed = text.unwrap_or_default().trim();
        let mut hasher = AHasher::default();

        if trimmed.chars().any(char::is_uppercase) {
            trimmed.to_lowercase().hash(&mut hasher);
        } else {
            trimmed.hash(&mut hasher);
        }

        MessageFingerprint(hasher.finish())
    }

    /// Get the raw hash value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts_share_fingerprint() {
        assert_eq!(
            MessageFingerprint::of(Some("buy now")),
            MessageFingerprint::of(Some("buy now"))
        );
    }

    #[test]
    fn test_normalization_ignores_case_and_padding() {
        let base = MessageFingerprint::of(Some("spam"));
        assert_eq!(base, MessageFingerprint::of(Some("SPAM")));
        assert_eq!(base, MessageFingerprint::of(Some("  Spam\n")));
    }

    #[test]
    fn test_different_texts_differ() {
        assert_ne!(
            MessageFingerprint::of(Some("lunch 25k")),
            MessageFingerprint::of(Some("lunch 26k"))
        );
    }

    #[test]
    fn test_missing_text_matches_empty_text() {
        assert_eq!(MessageFingerprint::of(None), MessageFingerprint::of(Some("")));
        assert_eq!(MessageFingerprint::of(None), MessageFingerprint::of(Some("   ")));
    }

    #[test]
    fn test_inner_whitespace_is_significant() {
        assert_ne!(
            MessageFingerprint::of(Some("a b")),
            MessageFingerprint::of(Some("a  b"))
        );
    }

    #[test]
    fn test_display_format() {
        let fp = MessageFingerprint::of(Some("hello"));
        let display = format!("{}", fp);
        assert_eq!(display.len(), 16);
        assert!(display.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
