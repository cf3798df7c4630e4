//! Administrator allowlist.

use crate::domain::actor::ActorId;
use std::collections::HashSet;

/// Set of actors allowed to bypass throttling and spam checks.
///
/// Admins are never exempt from explicit blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminAllowlist {
    ids: HashSet<ActorId>,
}

impl AdminAllowlist {
    /// Create an empty allowlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of numeric ids.
    ///
    /// Entries that are empty or not valid integers are skipped.
    ///
    /// # Example
    /// ```
    /// use abuse_guard::{ActorId, AdminAllowlist};
    ///
    /// let admins = AdminAllowlist::parse("12, 34,oops,,56");
    /// assert_eq!(admins.len(), 3);
    /// assert!(admins.contains(ActorId::new(34)));
    /// ```
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .filter_map(|entry| entry.trim().parse::<i64>().ok())
            .map(ActorId::new)
            .collect()
    }

    /// Check if an actor is an administrator.
    pub fn contains(&self, actor: ActorId) -> bool {
        self.ids.contains(&actor)
    }

    /// Add an administrator.
    pub fn insert(&mut self, actor: ActorId) -> bool {
        self.ids.insert(actor)
    }

    /// Number of administrators.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if there are no administrators.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<ActorId> for AdminAllowlist {
    fn from_iter<I: IntoIterator<Item = ActorId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
