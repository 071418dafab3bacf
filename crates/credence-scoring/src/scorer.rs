use chrono::{DateTime, Utc};
use credence_core::config::ScoringConfig;
use credence_core::constants::MAX_BATCH_SIZE;
use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::models::{Assertion, Challenge, Evidence};
use credence_core::weight::Weight;
use rayon::prelude::*;
use tracing::debug;

use crate::context::ScoringContext;
use crate::formula::{self, WeightBreakdown};

/// One assertion with its scoring inputs.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub assertion: &'a Assertion,
    pub evidence: &'a [Evidence],
    pub challenges: &'a [Challenge],
}

/// Stateless scorer bound to a scoring policy.
///
/// Holds no mutable state, so it can be shared and called from any
/// number of threads.
#[derive(Debug, Clone, Default)]
pub struct CredibilityScorer {
    config: ScoringConfig,
}

impl CredibilityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn context(&self, as_of: DateTime<Utc>) -> ScoringContext {
        ScoringContext::new(as_of, &self.config)
    }

    pub fn score(
        &self,
        assertion: &Assertion,
        evidence: &[Evidence],
        challenges: &[Challenge],
        as_of: DateTime<Utc>,
    ) -> CredenceResult<Weight> {
        formula::compute_weight(assertion, evidence, challenges, &self.context(as_of))
    }

    pub fn breakdown(
        &self,
        assertion: &Assertion,
        evidence: &[Evidence],
        challenges: &[Challenge],
        as_of: DateTime<Utc>,
    ) -> CredenceResult<WeightBreakdown> {
        let b = formula::compute_breakdown(assertion, evidence, challenges, &self.context(as_of))?;
        debug!(
            assertion_id = %assertion.id,
            evidence_sum = b.evidence_sum,
            adjustment = b.challenge_adjustment,
            weight = b.weight.value(),
            capped = b.capped,
            "weight computed"
        );
        Ok(b)
    }

    /// Score many assertions in parallel. Results line up with `inputs`;
    /// one bad input fails only its own slot.
    pub fn score_batch(
        &self,
        inputs: &[ScoringInput<'_>],
        as_of: DateTime<Utc>,
    ) -> CredenceResult<Vec<CredenceResult<Weight>>> {
        if inputs.len() > MAX_BATCH_SIZE {
            return Err(CredenceError::ValidationError(format!(
                "batch of {} exceeds the maximum of {MAX_BATCH_SIZE}",
                inputs.len()
            )));
        }
        let ctx = self.context(as_of);
        Ok(inputs
            .par_iter()
            .map(|input| formula::compute_weight(input.assertion, input.evidence, input.challenges, &ctx))
            .collect())
    }
}
