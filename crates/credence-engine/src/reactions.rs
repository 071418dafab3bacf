//! Recompute-on-event: rescoring after evidence and after a challenge closes.

use tracing::{debug, warn};

use credence_core::errors::CredenceResult;
use credence_core::models::{ChallengeOutcome, CredenceEvent, EvidenceScored, ScoreTrigger};
use credence_core::traits::{IAssertionStore, IChallengeStore, IEvidenceStore};
use credence_observability::tracing_setup::events;

use crate::engine::CredenceEngine;

impl CredenceEngine {
    /// Recompute and persist the weight of `assertion_id`, then publish
    /// `EvidenceScored`. Returns `None` for a frozen assertion, whose weight
    /// never moves.
    ///
    /// A lost version race is retried once against a fresh read.
    pub(crate) fn rescore(&self, assertion_id: &str, trigger: ScoreTrigger) -> CredenceResult<Option<EvidenceScored>> {
        let scored = match self.try_rescore(assertion_id, &trigger) {
            Err(e) if e.is_conflict() => {
                debug!(assertion_id, "weight write lost a version race, retrying");
                self.try_rescore(assertion_id, &trigger)?
            }
            other => other?,
        };
        let Some(scored) = scored else {
            return Ok(None);
        };

        events::evidence_scored(
            &scored.assertion_id,
            scored.weight.value(),
            scored.version,
            scored.evidence_count as usize,
        );
        let event = CredenceEvent::EvidenceScored(scored.clone());
        self.cache.apply_event(&event);
        self.bus.publish(event);
        Ok(Some(scored))
    }

    fn try_rescore(&self, assertion_id: &str, trigger: &ScoreTrigger) -> CredenceResult<Option<EvidenceScored>> {
        let assertion = self.assertion(assertion_id)?;
        if assertion.immutable {
            return Ok(None);
        }
        let evidence = self.store.evidence_for(assertion_id)?;
        let challenges = self.store.challenges_for(assertion_id)?;
        let now = self.clock.now();
        let weight = self.scorer.score(&assertion, &evidence, &challenges, now)?;
        let version = self.store.update_weight(assertion_id, weight, assertion.version)?;
        Ok(Some(EvidenceScored {
            assertion_id: assertion_id.to_string(),
            weight,
            version,
            evidence_count: evidence.len() as u32,
            trigger: trigger.clone(),
            scored_at: now,
        }))
    }

    /// Publish a resolution and fold it into the assertion's weight.
    ///
    /// The challenge is already persisted as resolved, so a failed rescore
    /// is logged rather than returned; the next evidence or resolution
    /// recomputes from the same inputs.
    pub(crate) fn on_resolved(&self, outcome: &ChallengeOutcome) {
        let event = CredenceEvent::ChallengeResolved(outcome.clone());
        self.cache.apply_event(&event);
        self.bus.publish(event);

        let trigger = ScoreTrigger::ChallengeResolution {
            challenge_id: outcome.challenge_id.clone(),
        };
        if let Err(e) = self.rescore(&outcome.assertion_id, trigger) {
            warn!(
                assertion_id = %outcome.assertion_id,
                challenge_id = %outcome.challenge_id,
                error = %e,
                "rescore after resolution failed"
            );
        }
    }
}
