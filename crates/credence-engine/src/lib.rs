//! # credence-engine
//!
//! [`CredenceEngine`] composes the four components around one store:
//!
//! ```text
//! submit ──▶ dedup ──▶ store ──▶ scorer ──▶ EvidenceScored
//!                        ▲
//! vote ──▶ challenges ───┴──▶ ChallengeResolved ──▶ rescore
//! promote ──▶ evaluator ──▶ freeze ──▶ AssertionPromoted
//! ```
//!
//! Every state change is published on a broadcast [`EventBus`].

pub mod bus;
pub mod engine;
pub mod options;
mod reactions;
mod submission;
pub mod sweeper;

pub use bus::EventBus;
pub use engine::CredenceEngine;
pub use options::EngineOptions;
pub use submission::{EvidenceReceipt, Submission};
