use serde::{Deserialize, Serialize};

use super::defaults;

/// Credibility scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Steepness `k` of the logistic squash `1 / (1 + e^(-k·sum))`.
    pub logistic_steepness: f64,
    /// Per-day decay rate for evidence that does not carry its own.
    pub default_decay_rate: f64,
    /// Largest weight shift a single resolved challenge can cause.
    pub challenge_impact: f64,
    /// Vote weight at which a challenge reaches ~63% of its impact.
    pub participation_scale: f64,
    /// Share of `challenge_impact` an expired, vote-less challenge adds.
    pub expired_dismissal_factor: f64,
    /// Ordinary scoring stops this far below the high-credibility threshold.
    pub ceiling_margin: f64,
    /// Max entries in the weight cache.
    pub cache_capacity: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            logistic_steepness: defaults::DEFAULT_LOGISTIC_STEEPNESS,
            default_decay_rate: defaults::DEFAULT_DECAY_RATE_PER_DAY,
            challenge_impact: defaults::DEFAULT_CHALLENGE_IMPACT,
            participation_scale: defaults::DEFAULT_PARTICIPATION_SCALE,
            expired_dismissal_factor: defaults::DEFAULT_EXPIRED_DISMISSAL_FACTOR,
            ceiling_margin: defaults::DEFAULT_CEILING_MARGIN,
            cache_capacity: defaults::DEFAULT_WEIGHT_CACHE_CAPACITY,
        }
    }
}
