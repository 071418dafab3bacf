use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A voter's position on a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    /// The challenge is right; the assertion should lose weight.
    Sustain,
    /// The challenge is wrong; the assertion stands.
    Dismiss,
    Abstain,
}

/// One voter's live vote on one challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Vote {
    pub id: String,
    pub challenge_id: String,
    pub voter_id: String,
    /// Reputation at the moment the vote was cast.
    pub reputation: f64,
    pub choice: VoteChoice,
    /// In (0, 1].
    pub confidence: f64,
    pub cast_at: DateTime<Utc>,
}
