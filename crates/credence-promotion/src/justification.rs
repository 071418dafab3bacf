//! Audit text for automatic promotions.

use credence_core::models::PromotionCriteria;

/// Summarize the criteria snapshot that allowed an automatic promotion.
pub fn automatic(criteria: &PromotionCriteria, final_weight: f64) -> String {
    format!(
        "automatic: methodology {:.2} >= {:.2}, consensus {:.2} >= {:.2}, evidence quality {:.2} >= {:.2}, \
         no open challenges; frozen at {:.3}",
        criteria.methodology_completion.value,
        criteria.methodology_completion.threshold,
        criteria.community_consensus.value,
        criteria.community_consensus.threshold,
        criteria.evidence_quality.value,
        criteria.evidence_quality.threshold,
        final_weight,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use credence_core::models::{CriterionResult, OpenChallengesCriterion};

    #[test]
    fn names_every_value() {
        let c = PromotionCriteria {
            methodology_completion: CriterionResult::at_least(1.0, 0.8),
            community_consensus: CriterionResult::at_least(0.85, 0.8),
            evidence_quality: CriterionResult::at_least(0.9, 0.8),
            open_challenges: OpenChallengesCriterion { open_count: 0, met: true },
        };
        let text = automatic(&c, 0.9);
        assert!(text.contains("consensus 0.85"));
        assert!(text.ends_with("0.900"));
    }
}
