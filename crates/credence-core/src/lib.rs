//! # credence-core
//!
//! Foundation crate for the Credence consensus engine.
//! Defines the data model, the error taxonomy, config, constants, and the
//! traits every collaborator (stores, reputation lookup, embedding service)
//! implements. Every other crate in the workspace depends on this.

pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod gate;
pub mod models;
pub mod traits;
pub mod weight;

// Re-export the most commonly used types at the crate root.
pub use clock::{Clock, SystemClock};
pub use config::CredenceConfig;
pub use errors::{CredenceError, CredenceResult, ErrorKind};
pub use gate::ReviewGate;
pub use models::{Assertion, Challenge, ChallengeState, CredenceEvent, Evidence, PromotionEvent, Vote};
pub use weight::{is_immutable, Weight};
