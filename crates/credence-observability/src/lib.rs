//! # credence-observability
//!
//! Structured tracing setup, one log event per domain transition, and
//! tracking of degraded dedup tiers with recovery status.

pub mod degradation;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use tracing_setup::{init_tracing, init_tracing_from_config, init_tracing_with_filter};
