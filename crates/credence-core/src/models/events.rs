//! Events emitted to notification and UI layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::challenge::ChallengeOutcome;
use super::promotion::PromotionEvent;
use crate::weight::Weight;

/// Why an assertion was rescored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum ScoreTrigger {
    Evidence { evidence_id: String },
    ChallengeResolution { challenge_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EvidenceScored {
    pub assertion_id: String,
    pub weight: Weight,
    /// Assertion version the weight was persisted at.
    pub version: u64,
    pub evidence_count: u32,
    pub trigger: ScoreTrigger,
    pub scored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChallengeOpened {
    pub challenge_id: String,
    pub assertion_id: String,
    pub topic: String,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CredenceEvent {
    EvidenceScored(EvidenceScored),
    ChallengeOpened(ChallengeOpened),
    ChallengeResolved(ChallengeOutcome),
    AssertionPromoted(PromotionEvent),
}

impl CredenceEvent {
    pub fn assertion_id(&self) -> &str {
        match self {
            CredenceEvent::EvidenceScored(e) => &e.assertion_id,
            CredenceEvent::ChallengeOpened(e) => &e.assertion_id,
            CredenceEvent::ChallengeResolved(o) => &o.assertion_id,
            CredenceEvent::AssertionPromoted(p) => &p.assertion_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CredenceEvent::EvidenceScored(_) => "evidence_scored",
            CredenceEvent::ChallengeOpened(_) => "challenge_opened",
            CredenceEvent::ChallengeResolved(_) => "challenge_resolved",
            CredenceEvent::AssertionPromoted(_) => "assertion_promoted",
        }
    }
}
