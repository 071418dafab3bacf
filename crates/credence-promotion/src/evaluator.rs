//! PromotionEvaluator: eligibility reports and the freeze.
//!
//! Both operations run under the assertion's [`ReviewGate`], the same gate
//! challenge resolution takes, so a review never sees a half-applied
//! resolution. The freeze itself is a compare-and-set in the store; the
//! gate only orders work inside one process.

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use credence_core::clock::Clock;
use credence_core::config::PromotionConfig;
use credence_core::errors::{CredenceError, CredenceResult, PromotionError};
use credence_core::gate::ReviewGate;
use credence_core::models::{
    Assertion, Challenge, EligibilityReport, Evidence, PromotionEvent, PromotionEventKind, PromotionMode,
    PromotionRequest,
};
use credence_core::traits::ICredenceStore;
use credence_core::constants::HIGH_CREDIBILITY_THRESHOLD;
use credence_core::weight::Weight;
use credence_observability::tracing_setup::events;
use credence_scoring::CredibilityScorer;

use crate::criteria::evaluate_criteria;
use crate::justification;

pub struct PromotionEvaluator {
    store: Arc<dyn ICredenceStore>,
    scorer: CredibilityScorer,
    gate: Arc<ReviewGate>,
    clock: Arc<dyn Clock>,
    config: PromotionConfig,
}

impl PromotionEvaluator {
    pub fn new(
        store: Arc<dyn ICredenceStore>,
        scorer: CredibilityScorer,
        gate: Arc<ReviewGate>,
        clock: Arc<dyn Clock>,
        config: PromotionConfig,
    ) -> Self {
        Self {
            store,
            scorer,
            gate,
            clock,
            config,
        }
    }

    /// Report each criterion. Read-only, also for frozen assertions.
    #[instrument(skip(self))]
    pub fn evaluate_eligibility(&self, assertion_id: &str) -> CredenceResult<EligibilityReport> {
        self.gate.with_review(assertion_id, || {
            let (assertion, evidence, challenges) = self.load(assertion_id)?;
            let criteria = evaluate_criteria(&assertion, &evidence, &challenges, &self.config);
            let already_promoted = assertion.immutable;
            let report = EligibilityReport {
                assertion_id: assertion_id.to_string(),
                eligible: !already_promoted && criteria.all_met(),
                overall_score: criteria.overall_score(),
                criteria,
                already_promoted,
                evaluated_at: self.clock.now(),
            };
            debug!(
                assertion_id,
                eligible = report.eligible,
                overall = report.overall_score,
                already_promoted,
                "eligibility evaluated"
            );
            Ok(report)
        })
    }

    /// Freeze `assertion_id`, writing exactly one ledger entry.
    ///
    /// Automatic requests fail with `NotEligible` listing the unmet
    /// criteria. Manual overrides need a non-empty justification and record
    /// the criteria they bypassed. Promoting a frozen assertion, or losing
    /// the freeze to a concurrent promotion, is an `ImmutabilityViolation`.
    #[instrument(skip(self, request), fields(mode = ?request.mode))]
    pub fn promote(&self, assertion_id: &str, request: PromotionRequest) -> CredenceResult<PromotionEvent> {
        if let PromotionMode::ManualOverride { actor } = &request.mode {
            if actor.trim().is_empty() {
                return Err(CredenceError::ValidationError("override actor is empty".into()));
            }
            if request.justification.trim().is_empty() {
                return Err(PromotionError::MissingJustification {
                    assertion_id: assertion_id.to_string(),
                }
                .into());
            }
        }

        self.gate.with_review(assertion_id, || {
            let (assertion, evidence, challenges) = self.load(assertion_id)?;
            assertion.ensure_writable("promote")?;

            let criteria = evaluate_criteria(&assertion, &evidence, &challenges, &self.config);
            let unmet = criteria.unmet();
            if request.mode == PromotionMode::Automatic && !unmet.is_empty() {
                return Err(PromotionError::NotEligible {
                    assertion_id: assertion_id.to_string(),
                    unmet,
                }
                .into());
            }

            let now = self.clock.now();
            let breakdown = self.scorer.breakdown(&assertion, &evidence, &challenges, now)?;
            let final_weight = Weight::new(breakdown.uncapped.max(HIGH_CREDIBILITY_THRESHOLD));

            let justification = match (&request.mode, request.justification.trim()) {
                (PromotionMode::Automatic, "") => justification::automatic(&criteria, final_weight.value()),
                (_, given) => given.to_string(),
            };
            let overridden = match request.mode {
                PromotionMode::Automatic => Vec::new(),
                PromotionMode::ManualOverride { .. } => unmet,
            };

            let event = PromotionEvent {
                id: Uuid::new_v4().to_string(),
                sequence: 0,
                assertion_id: assertion_id.to_string(),
                kind: PromotionEventKind::Promotion,
                previous_weight: assertion.weight,
                final_weight,
                timestamp: now,
                justification,
                mode: request.mode.clone(),
                criteria,
                overridden,
                supersedes: None,
            };

            if !self.store.freeze(assertion_id, &event)? {
                return Err(CredenceError::immutable(assertion_id, "promote"));
            }
            let recorded = self
                .store
                .events_for(assertion_id)?
                .into_iter()
                .find(|e| e.id == event.id)
                .unwrap_or(event);

            if let PromotionMode::ManualOverride { actor } = &recorded.mode {
                let bypassed: Vec<&str> = recorded.overridden.iter().map(|c| c.as_str()).collect();
                events::manual_override(assertion_id, actor, &bypassed, &recorded.justification);
            }
            events::assertion_promoted(
                assertion_id,
                recorded.previous_weight.value(),
                recorded.final_weight.value(),
            );
            info!(assertion_id, sequence = recorded.sequence, "assertion frozen");
            Ok(recorded)
        })
    }

    fn load(&self, assertion_id: &str) -> CredenceResult<(Assertion, Vec<Evidence>, Vec<Challenge>)> {
        let assertion = self
            .store
            .get_assertion(assertion_id)?
            .ok_or_else(|| CredenceError::AssertionNotFound {
                id: assertion_id.to_string(),
            })?;
        let evidence = self.store.evidence_for(assertion_id)?;
        let challenges = self.store.challenges_for(assertion_id)?;
        Ok((assertion, evidence, challenges))
    }
}
