use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::dedup::DuplicateMatch;
use super::fingerprint::FingerprintRecord;
use super::payload::Payload;
use crate::errors::{CredenceError, CredenceResult};
use crate::weight::{is_immutable, Weight};

/// Progress through the review methodology an assertion must complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodologyChecklist {
    pub required_steps: u32,
    pub completed_steps: u32,
}

impl MethodologyChecklist {
    pub fn new(required_steps: u32, completed_steps: u32) -> Self {
        Self {
            required_steps,
            completed_steps: completed_steps.min(required_steps),
        }
    }

    /// Completed share of required steps. No required steps means nothing
    /// has been reviewed, so the ratio is 0.
    pub fn completion_ratio(&self) -> f64 {
        if self.required_steps == 0 {
            return 0.0;
        }
        (self.completed_steps.min(self.required_steps) as f64) / self.required_steps as f64
    }
}

/// A claim whose trust status is tracked.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Assertion {
    /// UUID v4 identifier.
    pub id: String,
    pub payload: Payload,
    /// Current trust weight. Frozen once `immutable` is set.
    pub weight: Weight,
    /// One-way flag, set only by a promotion.
    pub immutable: bool,
    /// Bumped on every persisted write; used for optimistic concurrency.
    pub version: u64,
    /// Exact-tier content hash (hex).
    pub content_hash: String,
    pub fingerprints: Vec<FingerprintRecord>,
    /// Near-duplicate or semantic matches found at submission. Non-empty
    /// means the assertion was flagged for review.
    #[serde(default)]
    pub review_matches: Vec<DuplicateMatch>,
    pub methodology: MethodologyChecklist,
    pub created_at: DateTime<Utc>,
}

impl Assertion {
    /// A new assertion at the provisional weight.
    pub fn new(
        id: impl Into<String>,
        payload: Payload,
        methodology: MethodologyChecklist,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            payload,
            weight: Weight::PROVISIONAL,
            immutable: false,
            version: 0,
            content_hash: String::new(),
            fingerprints: Vec::new(),
            review_matches: Vec::new(),
            methodology,
            created_at,
        }
    }

    /// Attach dedup fingerprints and the exact content hash.
    pub fn with_fingerprints(mut self, content_hash: String, fingerprints: Vec<FingerprintRecord>) -> Self {
        self.content_hash = content_hash;
        self.fingerprints = fingerprints;
        self
    }

    pub fn with_review_matches(mut self, matches: Vec<DuplicateMatch>) -> Self {
        self.review_matches = matches;
        self
    }

    pub fn flagged_for_review(&self) -> bool {
        !self.review_matches.is_empty()
    }

    /// Promoted and at or above the high-credibility threshold.
    pub fn is_verified(&self) -> bool {
        is_immutable(self.weight, self.immutable)
    }

    /// Reject `operation` if this assertion is frozen.
    pub fn ensure_writable(&self, operation: &str) -> CredenceResult<()> {
        if self.immutable {
            return Err(CredenceError::immutable(&self.id, operation));
        }
        Ok(())
    }
}
