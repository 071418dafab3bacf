use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::payload::Payload;

/// Content offered to the dedup index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuplicateCandidate {
    pub payload: Payload,
    /// Namespace for the check. Evidence is scoped to its assertion so the
    /// same citation may back two different claims.
    pub scope: Option<String>,
}

impl DuplicateCandidate {
    pub fn new(payload: Payload) -> Self {
        Self { payload, scope: None }
    }

    pub fn scoped(payload: Payload, scope: impl Into<String>) -> Self {
        Self {
            payload,
            scope: Some(scope.into()),
        }
    }
}

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    NearDuplicate,
    Semantic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuplicateMatch {
    pub id: String,
    pub tier: MatchTier,
    /// 1.0 for exact matches, estimated similarity otherwise.
    pub score: f64,
}

/// What the caller should do with the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Byte-identical content exists; reuse the existing id.
    Merge,
    /// Near duplicate; create, but flag for review.
    Link,
    /// Semantic neighbor; create, reviewer decides.
    Review,
    /// Nothing similar.
    Create,
}

/// Result of `check_duplicate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub matches: Vec<DuplicateMatch>,
    pub recommendation: Recommendation,
    /// A tier was skipped because its backing service was unavailable.
    pub degraded: bool,
    pub degraded_reason: Option<String>,
}

impl DuplicateCheck {
    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            matches: Vec::new(),
            recommendation: Recommendation::Create,
            degraded: false,
            degraded_reason: None,
        }
    }

    /// Best match, if any.
    pub fn best(&self) -> Option<&DuplicateMatch> {
        self.matches
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }
}
