//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Per-action sliding window limiter
//! - Global fixed-window throttle
//! - Spam detector and block registry
//! - Security gate (decision making)
//! - Janitor (periodic eviction of stale state)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod blocklist;
pub mod gate;
pub mod global;
pub mod janitor;
pub mod limiter;
pub mod metrics;
pub mod ports;
pub mod spam;
