use serde::{Deserialize, Serialize};

use super::defaults;

/// Promotion evaluator thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionConfig {
    pub methodology_threshold: f64,
    pub consensus_threshold: f64,
    pub evidence_quality_threshold: f64,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            methodology_threshold: defaults::DEFAULT_METHODOLOGY_THRESHOLD,
            consensus_threshold: defaults::DEFAULT_CONSENSUS_THRESHOLD,
            evidence_quality_threshold: defaults::DEFAULT_EVIDENCE_QUALITY_THRESHOLD,
        }
    }
}
