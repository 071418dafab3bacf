use chrono::{DateTime, Duration, Utc};
use credence_core::config::{ChallengeConfig, SupermajorityPolicy};
use credence_core::models::ChallengeState;

use crate::tally::Tally;

/// When and how a challenge resolves.
#[derive(Debug, Clone)]
pub struct ResolutionPolicy {
    pub supermajority: SupermajorityPolicy,
    pub min_review_period: Duration,
    pub ambiguous_band: (f64, f64),
    pub min_votes: u32,
}

impl ResolutionPolicy {
    pub fn from_config(config: &ChallengeConfig) -> Self {
        Self {
            supermajority: config.supermajority,
            min_review_period: Duration::seconds(config.min_review_period_secs as i64),
            ambiguous_band: (config.ambiguous_band_low, config.ambiguous_band_high),
            min_votes: config.min_votes,
        }
    }

    /// Early resolution: one side holds at least the supermajority share,
    /// enough votes are in, and the review period has elapsed.
    pub fn supermajority_outcome(
        &self,
        tally: &Tally,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<ChallengeState> {
        if tally.vote_count < self.min_votes || tally.total_weight() <= 0.0 {
            return None;
        }
        if now - created_at < self.min_review_period {
            return None;
        }
        let threshold = self.supermajority.threshold();
        let ratio = tally.consensus_ratio();
        if ratio >= threshold {
            Some(ChallengeState::ResolvedSustained)
        } else if 1.0 - ratio >= threshold {
            Some(ChallengeState::ResolvedDismissed)
        } else {
            None
        }
    }

    /// Resolution at the deadline, or on a manual close.
    pub fn closing_outcome(&self, tally: &Tally) -> ChallengeState {
        if tally.total_weight() <= 0.0 {
            return ChallengeState::ClosedExpired;
        }
        let ratio = tally.consensus_ratio();
        let (low, high) = self.ambiguous_band;
        if (low..=high).contains(&ratio) {
            ChallengeState::ResolvedPartial
        } else if ratio > 0.5 {
            ChallengeState::ResolvedSustained
        } else {
            ChallengeState::ResolvedDismissed
        }
    }
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self::from_config(&ChallengeConfig::default())
    }
}
