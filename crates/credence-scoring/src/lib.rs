//! # credence-scoring
//!
//! Turns evidence and resolved challenges into a trust weight.
//!
//! ```text
//! sum       = Σ sign × credibility × e^(-rate × age_days)      (id order)
//! squashed  = 1 / (1 + e^(-k × sum))
//! uncapped  = clamp(squashed + Σ challenge adjustments, 0, 1)
//! weight    = min(uncapped, 0.90 - margin)
//! ```
//!
//! Everything here is a pure function of its inputs. The evaluation instant
//! is passed in through [`ScoringContext`], never read from a clock.

pub mod cache;
pub mod context;
pub mod factors;
pub mod formula;
pub mod scorer;

pub use cache::{CachedWeight, WeightCache};
pub use context::ScoringContext;
pub use formula::{compute_breakdown, compute_weight, WeightBreakdown};
pub use scorer::{CredibilityScorer, ScoringInput};
