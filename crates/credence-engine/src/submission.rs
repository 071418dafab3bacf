//! Ingestion: new assertions and new evidence.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::models::{
    Assertion, DuplicateCandidate, DuplicateCheck, DuplicateMatch, Evidence, FingerprintOwner, MatchTier,
    MethodologyChecklist, Payload, Recommendation, ScoreTrigger,
};
use credence_core::traits::{IAssertionStore, IEvidenceStore};
use credence_core::weight::Weight;
use credence_dedup::canonical::content_hash;
use credence_dedup::ExactClaim;

use crate::engine::CredenceEngine;

/// Result of [`CredenceEngine::submit_assertion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// The new assertion, or the existing one the payload merged into.
    pub assertion_id: String,
    /// False when the payload was an exact duplicate.
    pub created: bool,
    pub check: DuplicateCheck,
}

/// Result of [`CredenceEngine::submit_evidence`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceReceipt {
    pub evidence_id: String,
    /// Set when the same citation was already filed against this assertion.
    /// Nothing was stored and the weight did not move.
    pub duplicate_of: Option<String>,
    pub weight: Weight,
    pub version: u64,
}

impl CredenceEngine {
    /// Deduplicate `payload` and store it as a new assertion at the
    /// provisional weight. An exact duplicate returns the existing id.
    #[instrument(skip_all, fields(kind = payload.kind()))]
    pub async fn submit_assertion(
        &self,
        payload: Payload,
        methodology: MethodologyChecklist,
    ) -> CredenceResult<Submission> {
        let candidate = DuplicateCandidate::new(payload);
        let check = self.dedup.check_duplicate(&candidate).await?;
        if check.recommendation == Recommendation::Merge {
            if let Some(best) = check.best() {
                return Ok(Submission {
                    assertion_id: best.id.clone(),
                    created: false,
                    check,
                });
            }
        }

        // Two racing submissions of the same content both pass the read-only
        // check; the claim picks one winner.
        let id = match self.dedup.claim_exact(&candidate, || Uuid::new_v4().to_string())? {
            ExactClaim::Existing { id } => {
                return Ok(Submission {
                    assertion_id: id.clone(),
                    created: false,
                    check: merged(id),
                })
            }
            ExactClaim::Claimed { id } => id,
        };

        let owner = FingerprintOwner::Assertion(id.clone());
        let stored = async {
            let records = self.dedup.register(owner.clone(), &candidate).await?;
            let hash = content_hash(&candidate.payload);
            // Link and Review hits still create; the matches stay on the record.
            let assertion = Assertion::new(id.clone(), candidate.payload.clone(), methodology, self.clock.now())
                .with_fingerprints(hash, records)
                .with_review_matches(check.matches.clone());
            self.store.insert_assertion(&assertion)?;
            Ok::<_, CredenceError>(assertion)
        }
        .await;

        match stored {
            Ok(assertion) => {
                self.cache.insert_if_newer(&assertion.id, assertion.version, assertion.weight);
                debug!(assertion_id = %id, recommendation = ?check.recommendation, "assertion created");
                Ok(Submission {
                    assertion_id: id,
                    created: true,
                    check,
                })
            }
            Err(e) => {
                warn!(assertion_id = %id, error = %e, "assertion insert failed, releasing fingerprints");
                self.dedup.remove(&owner);
                Err(e)
            }
        }
    }

    /// File evidence against an assertion and rescore it.
    ///
    /// Evidence carrying a citation already filed against the same assertion
    /// is reported as a duplicate and not stored.
    #[instrument(skip_all, fields(evidence_id = evidence.id(), assertion_id = evidence.assertion_id()))]
    pub async fn submit_evidence(&self, evidence: Evidence) -> CredenceResult<EvidenceReceipt> {
        evidence.validate()?;
        let assertion = self
            .store
            .get_assertion(evidence.assertion_id())?
            .ok_or_else(|| CredenceError::InvalidEvidence {
                evidence_id: evidence.id().to_string(),
                assertion_id: evidence.assertion_id().to_string(),
            })?;
        assertion.ensure_writable("submit_evidence")?;
        if self.store.get_evidence(evidence.id())?.is_some() {
            return Err(CredenceError::Conflict {
                resource: format!("evidence:{}", evidence.id()),
                reason: "evidence id already filed".into(),
            });
        }

        let owner = FingerprintOwner::Evidence(evidence.id().to_string());
        let citation = evidence.citation().trim();
        let candidate = (!citation.is_empty())
            .then(|| DuplicateCandidate::scoped(Payload::Text(citation.to_string()), assertion.id.as_str()));
        if let Some(candidate) = &candidate {
            if let ExactClaim::Existing { id } = self.dedup.claim_exact(candidate, || evidence.id().to_string())? {
                debug!(duplicate_of = %id, "evidence citation already filed");
                return Ok(EvidenceReceipt {
                    evidence_id: evidence.id().to_string(),
                    duplicate_of: Some(id),
                    weight: assertion.weight,
                    version: assertion.version,
                });
            }
            if let Err(e) = self.dedup.register(owner.clone(), candidate).await {
                self.dedup.release(&owner, candidate);
                return Err(e);
            }
        }

        // Promotion freezes under the same gate, so evidence cannot land on
        // an assertion frozen after the check above.
        let inserted = self.gate.with_review(&assertion.id, || {
            self.store
                .get_assertion(&assertion.id)?
                .ok_or_else(|| CredenceError::AssertionNotFound {
                    id: assertion.id.clone(),
                })?
                .ensure_writable("submit_evidence")?;
            self.store.insert_evidence(&evidence)
        });
        if let Err(e) = inserted {
            // Only this citation's key; a same-id filing keeps its own.
            if let Some(candidate) = &candidate {
                self.dedup.release(&owner, candidate);
            }
            return Err(e);
        }

        let trigger = ScoreTrigger::Evidence {
            evidence_id: evidence.id().to_string(),
        };
        let (weight, version) = match self.rescore(&assertion.id, trigger)? {
            Some(scored) => (scored.weight, scored.version),
            // Promoted between the insert and the rescore.
            None => {
                let current = self.assertion(&assertion.id)?;
                (current.weight, current.version)
            }
        };
        Ok(EvidenceReceipt {
            evidence_id: evidence.id().to_string(),
            duplicate_of: None,
            weight,
            version,
        })
    }
}

fn merged(id: String) -> DuplicateCheck {
    DuplicateCheck {
        is_duplicate: true,
        matches: vec![DuplicateMatch {
            id,
            tier: MatchTier::Exact,
            score: 1.0,
        }],
        recommendation: Recommendation::Merge,
        ..DuplicateCheck::unique()
    }
}
