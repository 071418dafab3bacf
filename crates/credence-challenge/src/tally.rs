use std::collections::BTreeMap;

use credence_core::models::{Vote, VoteChoice};
use serde::Serialize;

use crate::weighting::vote_weight;

/// Weighted vote totals for one challenge. Abstentions are counted but
/// carry no weight on either side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Tally {
    pub sustain_weight: f64,
    pub dismiss_weight: f64,
    /// Sustain and dismiss votes.
    pub vote_count: u32,
    pub abstain_count: u32,
}

impl Tally {
    pub fn total_weight(&self) -> f64 {
        self.sustain_weight + self.dismiss_weight
    }

    /// Sustain share of the weighted vote, or 0 when nobody took a side.
    pub fn consensus_ratio(&self) -> f64 {
        let total = self.total_weight();
        if total <= 0.0 {
            0.0
        } else {
            self.sustain_weight / total
        }
    }
}

/// Tally live votes in voter order.
pub fn tally(votes: &BTreeMap<String, Vote>) -> Tally {
    votes.values().fold(Tally::default(), |mut t, v| {
        match v.choice {
            VoteChoice::Sustain => {
                t.sustain_weight += vote_weight(v.reputation, v.confidence);
                t.vote_count += 1;
            }
            VoteChoice::Dismiss => {
                t.dismiss_weight += vote_weight(v.reputation, v.confidence);
                t.vote_count += 1;
            }
            VoteChoice::Abstain => t.abstain_count += 1,
        }
        t
    })
}
