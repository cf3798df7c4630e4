//! Environment-driven configuration.

use crate::domain::admin::AdminAllowlist;
use std::env;
use tracing::{debug, info};

/// Environment variable holding the comma-separated admin ids.
pub const ADMIN_IDS_ENV: &str = "ADMIN_IDS";

/// Load the admin allowlist from [`ADMIN_IDS_ENV`].
///
/// A missing or empty variable yields an empty allowlist.
pub fn admin_allowlist_from_env() -> AdminAllowlist {
    admin_allowlist_from_var(ADMIN_IDS_ENV)
}

/// Load the admin allowlist from an arbitrary environment variable.
///
/// Invalid entries are skipped; see [`AdminAllowlist::parse`].
pub fn admin_allowlist_from_var(name: &str) -> AdminAllowlist {
    match env::var(name) {
        Ok(value) => {
            let admins = AdminAllowlist::parse(&value);
            info!(var = name, count = admins.len(), "loaded admin allowlist");
            admins
        }
        Err(e) => {
            debug!(var = name, error = %e, "admin allowlist not configured");
            AdminAllowlist::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::ActorId;

    // Each test uses its own variable so they can run in parallel
    #[test]
    fn test_reads_variable() {
        env::set_var("ABUSE_GUARD_TEST_ADMINS_A", "1, 2,x,3");
        let admins = admin_allowlist_from_var("ABUSE_GUARD_TEST_ADMINS_A");
        assert_eq!(admins.len(), 3);
        assert!(admins.contains(ActorId::new(2)));
    }

    #[test]
    fn test_missing_variable_is_empty() {
        let admins = admin_allowlist_from_var("ABUSE_GUARD_TEST_ADMINS_UNSET");
        assert!(admins.is_empty());
    }
}
