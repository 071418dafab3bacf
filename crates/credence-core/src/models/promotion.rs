//! Promotion criteria, requests, and the append-only ledger entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::weight::Weight;

/// The four promotion criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    MethodologyCompletion,
    CommunityConsensus,
    EvidenceQuality,
    OpenChallenges,
}

impl CriterionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CriterionKind::MethodologyCompletion => "methodology_completion",
            CriterionKind::CommunityConsensus => "community_consensus",
            CriterionKind::EvidenceQuality => "evidence_quality",
            CriterionKind::OpenChallenges => "open_challenges",
        }
    }
}

/// A ratio criterion and whether it cleared its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CriterionResult {
    pub value: f64,
    pub threshold: f64,
    pub met: bool,
}

impl CriterionResult {
    pub fn at_least(value: f64, threshold: f64) -> Self {
        Self {
            value,
            threshold,
            met: value >= threshold,
        }
    }
}

/// Zero non-terminal challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OpenChallengesCriterion {
    pub open_count: u32,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionCriteria {
    pub methodology_completion: CriterionResult,
    pub community_consensus: CriterionResult,
    pub evidence_quality: CriterionResult,
    pub open_challenges: OpenChallengesCriterion,
}

impl PromotionCriteria {
    /// Criteria that did not hold, in a fixed order.
    pub fn unmet(&self) -> Vec<CriterionKind> {
        let mut unmet = Vec::new();
        if !self.methodology_completion.met {
            unmet.push(CriterionKind::MethodologyCompletion);
        }
        if !self.community_consensus.met {
            unmet.push(CriterionKind::CommunityConsensus);
        }
        if !self.evidence_quality.met {
            unmet.push(CriterionKind::EvidenceQuality);
        }
        if !self.open_challenges.met {
            unmet.push(CriterionKind::OpenChallenges);
        }
        unmet
    }

    /// No partial credit: all four must hold.
    pub fn all_met(&self) -> bool {
        self.unmet().is_empty()
    }

    /// Mean of the three ratio criteria.
    pub fn overall_score(&self) -> f64 {
        (self.methodology_completion.value + self.community_consensus.value + self.evidence_quality.value) / 3.0
    }
}

/// Result of `evaluate_eligibility`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EligibilityReport {
    pub assertion_id: String,
    pub eligible: bool,
    pub criteria: PromotionCriteria,
    pub overall_score: f64,
    /// Already frozen; never eligible again.
    pub already_promoted: bool,
    pub evaluated_at: DateTime<Utc>,
}

/// How a promotion was authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PromotionMode {
    /// All criteria held.
    Automatic,
    /// An authorized actor promoted despite unmet criteria.
    ManualOverride { actor: String },
}

/// A promotion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionRequest {
    pub mode: PromotionMode,
    pub justification: String,
}

impl PromotionRequest {
    pub fn automatic(justification: impl Into<String>) -> Self {
        Self {
            mode: PromotionMode::Automatic,
            justification: justification.into(),
        }
    }

    pub fn manual_override(actor: impl Into<String>, justification: impl Into<String>) -> Self {
        Self {
            mode: PromotionMode::ManualOverride { actor: actor.into() },
            justification: justification.into(),
        }
    }
}

/// Ledger entry kind. Only promotions exist today; a later appeal entry
/// would reference the promotion it supersedes instead of rewriting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionEventKind {
    Promotion,
}

/// Append-only record of a promotion. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionEvent {
    pub id: String,
    /// Ledger position, assigned on append.
    pub sequence: u64,
    pub assertion_id: String,
    pub kind: PromotionEventKind,
    pub previous_weight: Weight,
    pub final_weight: Weight,
    pub timestamp: DateTime<Utc>,
    pub justification: String,
    pub mode: PromotionMode,
    /// Criteria snapshot at promotion time.
    pub criteria: PromotionCriteria,
    /// Criteria a manual override bypassed. Empty for automatic promotions.
    pub overridden: Vec<CriterionKind>,
    /// Earlier ledger entry this one supersedes.
    pub supersedes: Option<String>,
}
