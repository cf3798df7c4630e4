//! Domain layer - pure business logic with no I/O.
//!
//! This layer contains the core concepts of abuse prevention:
//! - Actor identity and action classes
//! - Rate limiting and spam policies
//! - Message fingerprints
//! - Admission decisions and spam verdicts
//! - Admin allowlist and input sanitization
//! - Audit events
//!
//! All types in this layer are pure and easily testable.

pub mod actor;
pub mod admin;
pub mod audit;
pub mod decision;
pub mod fingerprint;
pub mod policy;
pub mod sanitize;
