//! The four promotion criteria.

pub mod consensus;
pub mod quality;

use credence_core::config::PromotionConfig;
use credence_core::models::{
    Assertion, Challenge, CriterionResult, Evidence, OpenChallengesCriterion, PromotionCriteria,
};

pub use consensus::community_consensus;
pub use quality::evidence_quality;

/// Evaluate every criterion. Pure; never touches the assertion.
pub fn evaluate_criteria(
    assertion: &Assertion,
    evidence: &[Evidence],
    challenges: &[Challenge],
    config: &PromotionConfig,
) -> PromotionCriteria {
    let open_count = challenges.iter().filter(|c| !c.is_terminal()).count() as u32;
    PromotionCriteria {
        methodology_completion: CriterionResult::at_least(
            assertion.methodology.completion_ratio(),
            config.methodology_threshold,
        ),
        community_consensus: CriterionResult::at_least(
            community_consensus(evidence, challenges),
            config.consensus_threshold,
        ),
        evidence_quality: CriterionResult::at_least(evidence_quality(evidence), config.evidence_quality_threshold),
        open_challenges: OpenChallengesCriterion {
            open_count,
            met: open_count == 0,
        },
    }
}
