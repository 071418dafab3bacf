//! In-memory store.
//!
//! Per-key atomicity comes from DashMap shard locks: a compare-and-set
//! runs entirely inside one `get_mut` guard.

use std::sync::Mutex;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use credence_core::errors::{CredenceError, CredenceResult, StorageError};
use credence_core::models::{Assertion, Challenge, Evidence, PromotionEvent};
use credence_core::traits::{IAssertionStore, IChallengeStore, IEvidenceStore, IPromotionLedger};
use credence_core::weight::Weight;

#[derive(Debug, Default)]
pub struct MemoryStore {
    assertions: DashMap<String, Assertion>,
    evidence: DashMap<String, Evidence>,
    /// Evidence ids per assertion, in submission order.
    evidence_index: DashMap<String, Vec<String>>,
    challenges: DashMap<String, Challenge>,
    ledger: Mutex<Vec<PromotionEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> CredenceResult<std::sync::MutexGuard<'_, Vec<PromotionEvent>>> {
        self.ledger.lock().map_err(|_| {
            CredenceError::StorageError(StorageError::LockPoisoned {
                resource: "promotion_ledger".into(),
            })
        })
    }
}

fn duplicate(resource: &str, id: &str) -> CredenceError {
    CredenceError::Conflict {
        resource: format!("{resource}:{id}"),
        reason: "already exists".into(),
    }
}

impl IAssertionStore for MemoryStore {
    fn insert_assertion(&self, assertion: &Assertion) -> CredenceResult<()> {
        match self.assertions.entry(assertion.id.clone()) {
            Entry::Occupied(_) => Err(duplicate("assertion", &assertion.id)),
            Entry::Vacant(slot) => {
                slot.insert(assertion.clone());
                Ok(())
            }
        }
    }

    fn get_assertion(&self, id: &str) -> CredenceResult<Option<Assertion>> {
        Ok(self.assertions.get(id).map(|a| a.clone()))
    }

    fn update_weight(&self, id: &str, weight: Weight, expected_version: u64) -> CredenceResult<u64> {
        let mut a = self
            .assertions
            .get_mut(id)
            .ok_or_else(|| CredenceError::AssertionNotFound { id: id.to_string() })?;
        a.ensure_writable("update_weight")?;
        if a.version != expected_version {
            return Err(CredenceError::version_conflict(format!("assertion:{id}"), expected_version, a.version));
        }
        a.weight = weight;
        a.version += 1;
        Ok(a.version)
    }

    fn freeze(&self, id: &str, event: &PromotionEvent) -> CredenceResult<bool> {
        let mut a = self
            .assertions
            .get_mut(id)
            .ok_or_else(|| CredenceError::AssertionNotFound { id: id.to_string() })?;
        if a.immutable {
            return Ok(false);
        }
        // Ledger append happens while the assertion guard is held, so no
        // reader sees the flag without its event.
        let mut ledger = self.ledger()?;
        let mut entry = event.clone();
        entry.sequence = ledger.len() as u64 + 1;
        ledger.push(entry);
        a.immutable = true;
        a.weight = event.final_weight;
        a.version += 1;
        Ok(true)
    }

    fn assertion_ids(&self) -> CredenceResult<Vec<String>> {
        let mut ids: Vec<String> = self.assertions.iter().map(|a| a.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}

impl IEvidenceStore for MemoryStore {
    fn insert_evidence(&self, evidence: &Evidence) -> CredenceResult<()> {
        if !self.assertions.contains_key(evidence.assertion_id()) {
            return Err(CredenceError::InvalidEvidence {
                evidence_id: evidence.id().to_string(),
                assertion_id: evidence.assertion_id().to_string(),
            });
        }
        match self.evidence.entry(evidence.id().to_string()) {
            Entry::Occupied(_) => Err(duplicate("evidence", evidence.id())),
            Entry::Vacant(slot) => {
                slot.insert(evidence.clone());
                self.evidence_index
                    .entry(evidence.assertion_id().to_string())
                    .or_default()
                    .push(evidence.id().to_string());
                Ok(())
            }
        }
    }

    fn get_evidence(&self, id: &str) -> CredenceResult<Option<Evidence>> {
        Ok(self.evidence.get(id).map(|e| e.clone()))
    }

    fn evidence_for(&self, assertion_id: &str) -> CredenceResult<Vec<Evidence>> {
        let ids = self
            .evidence_index
            .get(assertion_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.evidence.get(id).map(|e| e.clone()))
            .collect())
    }
}

impl IChallengeStore for MemoryStore {
    fn insert_challenge(&self, challenge: &Challenge) -> CredenceResult<()> {
        match self.challenges.entry(challenge.id.clone()) {
            Entry::Occupied(_) => Err(duplicate("challenge", &challenge.id)),
            Entry::Vacant(slot) => {
                slot.insert(challenge.clone());
                Ok(())
            }
        }
    }

    fn get_challenge(&self, id: &str) -> CredenceResult<Option<Challenge>> {
        Ok(self.challenges.get(id).map(|c| c.clone()))
    }

    fn save_challenge(&self, challenge: &Challenge, expected_version: u64) -> CredenceResult<u64> {
        let mut stored = self
            .challenges
            .get_mut(&challenge.id)
            .ok_or_else(|| CredenceError::ChallengeNotFound { id: challenge.id.clone() })?;
        if stored.version != expected_version {
            return Err(CredenceError::version_conflict(
                format!("challenge:{}", challenge.id),
                expected_version,
                stored.version,
            ));
        }
        let mut next = challenge.clone();
        next.version = expected_version + 1;
        *stored = next;
        Ok(expected_version + 1)
    }

    fn challenges_for(&self, assertion_id: &str) -> CredenceResult<Vec<Challenge>> {
        let mut out: Vec<Challenge> = self
            .challenges
            .iter()
            .filter(|c| c.assertion_id == assertion_id)
            .map(|c| c.clone())
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    fn open_challenges(&self) -> CredenceResult<Vec<Challenge>> {
        let mut out: Vec<Challenge> = self
            .challenges
            .iter()
            .filter(|c| !c.is_terminal())
            .map(|c| c.clone())
            .collect();
        out.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }
}

impl IPromotionLedger for MemoryStore {
    fn events_for(&self, assertion_id: &str) -> CredenceResult<Vec<PromotionEvent>> {
        Ok(self
            .ledger()?
            .iter()
            .filter(|e| e.assertion_id == assertion_id)
            .cloned()
            .collect())
    }

    fn all_events(&self) -> CredenceResult<Vec<PromotionEvent>> {
        Ok(self.ledger()?.clone())
    }
}
