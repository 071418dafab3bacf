use serde::{Deserialize, Serialize};

use super::defaults;

/// Supermajority required for early auto-resolution.
///
/// Both documented readings are available: `Strict` (0.99) and
/// `TwoThirds`. `Custom` covers anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SupermajorityPolicy {
    Strict,
    #[default]
    TwoThirds,
    Custom { threshold: f64 },
}

impl SupermajorityPolicy {
    pub fn threshold(self) -> f64 {
        match self {
            SupermajorityPolicy::Strict => defaults::STRICT_SUPERMAJORITY,
            SupermajorityPolicy::TwoThirds => defaults::TWO_THIRDS_SUPERMAJORITY,
            SupermajorityPolicy::Custom { threshold } => threshold,
        }
    }
}

/// Challenge consensus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    pub supermajority: SupermajorityPolicy,
    /// No auto-resolution before this long after opening.
    pub min_review_period_secs: u64,
    /// Deadline offset for new challenges.
    pub voting_period_secs: u64,
    /// At the deadline, ratios inside [low, high] resolve as partial.
    pub ambiguous_band_low: f64,
    pub ambiguous_band_high: f64,
    /// Non-abstain votes needed before a supermajority counts.
    pub min_votes: u32,
    /// Period of the deadline sweep.
    pub sweep_interval_secs: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            supermajority: SupermajorityPolicy::default(),
            min_review_period_secs: defaults::DEFAULT_MIN_REVIEW_PERIOD_SECS,
            voting_period_secs: defaults::DEFAULT_VOTING_PERIOD_SECS,
            ambiguous_band_low: defaults::DEFAULT_AMBIGUOUS_BAND_LOW,
            ambiguous_band_high: defaults::DEFAULT_AMBIGUOUS_BAND_HIGH,
            min_votes: defaults::DEFAULT_MIN_VOTES,
            sweep_interval_secs: defaults::DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}
