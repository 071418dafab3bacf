//! # credence-challenge
//!
//! Dispute lifecycle for assertions. Votes are weighted by
//! `sqrt(reputation) × confidence`; a challenge resolves early on a
//! supermajority after the review period, or at its deadline by the
//! ambiguous-band rule.

pub mod engine;
pub mod policy;
pub mod tally;
pub mod transitions;
pub mod weighting;

pub use engine::{ChallengeEngine, VoteReceipt};
pub use policy::ResolutionPolicy;
pub use tally::{tally, Tally};
pub use weighting::vote_weight;
