use credence_core::constants::HIGH_CREDIBILITY_THRESHOLD;
use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::models::{Assertion, Challenge, Evidence};
use credence_core::weight::Weight;
use serde::Serialize;

use crate::context::ScoringContext;
use crate::factors;

/// Every intermediate value of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightBreakdown {
    /// Signed, decayed evidence sum.
    pub evidence_sum: f64,
    /// Logistic squash of `evidence_sum`.
    pub squashed: f64,
    pub challenge_adjustment: f64,
    /// `squashed + challenge_adjustment`, clamped to [0, 1] but not capped.
    pub uncapped: f64,
    /// Final weight.
    pub weight: Weight,
    /// The high-credibility cap lowered the result.
    pub capped: bool,
    /// The assertion is frozen and `weight` is its stored value.
    pub frozen: bool,
    pub evidence_count: usize,
}

/// Logistic squash `1 / (1 + e^(-k·x))`. Maps 0 to 0.5.
pub fn squash(sum: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (-steepness * sum).exp())
}

/// Highest weight ordinary scoring may produce.
pub fn ceiling(ctx: &ScoringContext) -> f64 {
    (HIGH_CREDIBILITY_THRESHOLD - ctx.ceiling_margin).max(0.0)
}

/// Compute the weight of `assertion`.
///
/// Fails with `InvalidEvidence` when a piece of evidence targets another
/// assertion. A frozen assertion returns its stored weight unchanged.
pub fn compute_weight(
    assertion: &Assertion,
    evidence: &[Evidence],
    challenges: &[Challenge],
    ctx: &ScoringContext,
) -> CredenceResult<Weight> {
    Ok(compute_breakdown(assertion, evidence, challenges, ctx)?.weight)
}

/// [`compute_weight`] with every intermediate value.
pub fn compute_breakdown(
    assertion: &Assertion,
    evidence: &[Evidence],
    challenges: &[Challenge],
    ctx: &ScoringContext,
) -> CredenceResult<WeightBreakdown> {
    validate_inputs(assertion, evidence, challenges)?;

    if assertion.immutable {
        let frozen = assertion.weight.value();
        return Ok(WeightBreakdown {
            evidence_sum: 0.0,
            squashed: frozen,
            challenge_adjustment: 0.0,
            uncapped: frozen,
            weight: assertion.weight,
            capped: false,
            frozen: true,
            evidence_count: evidence.len(),
        });
    }

    // Fixed summation order keeps the float result independent of input order.
    let mut ordered: Vec<&Evidence> = evidence.iter().collect();
    ordered.sort_by(|a, b| a.id().cmp(b.id()));
    let evidence_sum: f64 = ordered
        .iter()
        .map(|e| factors::decay::contribution(e, ctx.as_of, ctx.default_decay_rate))
        .sum();

    let mut history: Vec<&Challenge> = challenges.iter().collect();
    history.sort_by(|a, b| a.id.cmp(&b.id));
    let challenge_adjustment = factors::challenge::total_adjustment(&history, ctx);

    let squashed = squash(evidence_sum, ctx.logistic_steepness);
    let uncapped = (squashed + challenge_adjustment).clamp(0.0, 1.0);
    let limit = ceiling(ctx);
    let capped = uncapped > limit;
    let weight = Weight::new(uncapped.min(limit));

    Ok(WeightBreakdown {
        evidence_sum,
        squashed,
        challenge_adjustment,
        uncapped,
        weight,
        capped,
        frozen: false,
        evidence_count: evidence.len(),
    })
}

fn validate_inputs(assertion: &Assertion, evidence: &[Evidence], challenges: &[Challenge]) -> CredenceResult<()> {
    for e in evidence {
        if e.assertion_id() != assertion.id {
            return Err(CredenceError::InvalidEvidence {
                evidence_id: e.id().to_string(),
                assertion_id: e.assertion_id().to_string(),
            });
        }
        e.validate()?;
    }
    for c in challenges {
        if c.assertion_id != assertion.id {
            return Err(CredenceError::ValidationError(format!(
                "challenge {} targets {}, not {}",
                c.id, c.assertion_id, assertion.id
            )));
        }
    }
    Ok(())
}
