//! # credence-promotion
//!
//! Decides whether an assertion has earned verified status and, when it
//! has, freezes it. Four criteria must all hold:
//! - methodology completion ≥ 0.8
//! - community consensus ≥ 0.8
//! - mean evidence quality ≥ 0.8
//! - no open challenges
//!
//! A promotion writes one ledger entry and flips `immutable` in a single
//! compare-and-set. Nothing else in the workspace sets that flag.

pub mod criteria;
pub mod evaluator;
pub mod justification;

pub use criteria::evaluate_criteria;
pub use evaluator::PromotionEvaluator;
