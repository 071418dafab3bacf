//! Challenge (dispute) model and its state set.
//!
//! ```text
//! OPEN ──first vote──▶ VOTING ──▶ RESOLVED_SUSTAINED
//!   │                    │    ├──▶ RESOLVED_DISMISSED
//!   │                    │    ├──▶ RESOLVED_PARTIAL
//!   └────────────────────┴────└──▶ CLOSED_EXPIRED
//! ```
//!
//! Terminal states are final.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::vote::Vote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    Open,
    Voting,
    ResolvedSustained,
    ResolvedDismissed,
    ResolvedPartial,
    ClosedExpired,
}

impl ChallengeState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ChallengeState::Open | ChallengeState::Voting)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeState::Open => "open",
            ChallengeState::Voting => "voting",
            ChallengeState::ResolvedSustained => "resolved_sustained",
            ChallengeState::ResolvedDismissed => "resolved_dismissed",
            ChallengeState::ResolvedPartial => "resolved_partial",
            ChallengeState::ClosedExpired => "closed_expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "open" => ChallengeState::Open,
            "voting" => ChallengeState::Voting,
            "resolved_sustained" => ChallengeState::ResolvedSustained,
            "resolved_dismissed" => ChallengeState::ResolvedDismissed,
            "resolved_partial" => ChallengeState::ResolvedPartial,
            "closed_expired" => ChallengeState::ClosedExpired,
            _ => return None,
        })
    }
}

impl fmt::Display for ChallengeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a challenge to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum ResolutionTrigger {
    /// One side crossed the supermajority after the review period.
    Supermajority { threshold: f64 },
    /// The voting deadline passed.
    Deadline,
    /// An authorized actor closed the challenge.
    Manual { actor: String },
}

/// Final tally of a resolved challenge. Payload of `ChallengeResolved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChallengeOutcome {
    pub challenge_id: String,
    pub assertion_id: String,
    pub state: ChallengeState,
    /// Sustain weight over total non-abstain weight; 0 when nobody voted.
    pub consensus_ratio: f64,
    pub sustain_weight: f64,
    pub dismiss_weight: f64,
    pub total_weight: f64,
    pub vote_count: u32,
    pub trigger: ResolutionTrigger,
    pub resolved_at: DateTime<Utc>,
}

/// A formal, voted dispute against an assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Challenge {
    pub id: String,
    pub assertion_id: String,
    /// Dispute topic. At most one non-terminal challenge per (assertion, topic).
    pub topic: String,
    pub raised_by: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub state: ChallengeState,
    /// Bumped on every persisted write.
    pub version: u64,
    /// Live votes keyed by voter id. Re-voting replaces the entry.
    pub votes: BTreeMap<String, Vote>,
    pub outcome: Option<ChallengeOutcome>,
}

impl Challenge {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether the deadline has passed at `now`.
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }
}
