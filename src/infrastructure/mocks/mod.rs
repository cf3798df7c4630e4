//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling controlled testing of application logic.

pub mod audit;
pub mod clock;
pub mod layer;

pub use audit::{FailingAuditSink, RecordingAuditSink};
pub use clock::MockClock;
pub use layer::MockCaptureLayer;
