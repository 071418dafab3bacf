use super::ErrorKind;
use crate::models::CriterionKind;

/// Promotion evaluator errors.
#[derive(Debug, thiserror::Error)]
pub enum PromotionError {
    #[error("assertion {assertion_id} not eligible for promotion; unmet: {}", format_unmet(.unmet))]
    NotEligible {
        assertion_id: String,
        unmet: Vec<CriterionKind>,
    },

    #[error("manual override of {assertion_id} requires a non-empty justification")]
    MissingJustification { assertion_id: String },
}

impl PromotionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PromotionError::NotEligible { .. } | PromotionError::MissingJustification { .. } => {
                ErrorKind::Validation
            }
        }
    }
}

fn format_unmet(unmet: &[CriterionKind]) -> String {
    unmet
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
