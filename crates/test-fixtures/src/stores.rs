use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use credence_core::errors::CredenceResult;
use credence_core::models::{Assertion, Challenge, Evidence, PromotionEvent};
use credence_core::traits::{IAssertionStore, IChallengeStore, IEvidenceStore, IPromotionLedger};
use credence_core::weight::Weight;

/// Store wrapper whose `get_assertion` sleeps for a settable delay, so a
/// test can start a second operation in the middle of a writable check.
/// Everything else passes straight through.
pub struct SlowAssertionReads<S> {
    inner: Arc<S>,
    delay_ms: AtomicU64,
}

impl<S> SlowAssertionReads<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            delay_ms: AtomicU64::new(0),
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

impl<S: IAssertionStore> IAssertionStore for SlowAssertionReads<S> {
    fn insert_assertion(&self, assertion: &Assertion) -> CredenceResult<()> {
        self.inner.insert_assertion(assertion)
    }

    fn get_assertion(&self, id: &str) -> CredenceResult<Option<Assertion>> {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
        self.inner.get_assertion(id)
    }

    fn update_weight(&self, id: &str, weight: Weight, expected_version: u64) -> CredenceResult<u64> {
        self.inner.update_weight(id, weight, expected_version)
    }

    fn freeze(&self, id: &str, event: &PromotionEvent) -> CredenceResult<bool> {
        self.inner.freeze(id, event)
    }

    fn assertion_ids(&self) -> CredenceResult<Vec<String>> {
        self.inner.assertion_ids()
    }
}

impl<S: IEvidenceStore> IEvidenceStore for SlowAssertionReads<S> {
    fn insert_evidence(&self, evidence: &Evidence) -> CredenceResult<()> {
        self.inner.insert_evidence(evidence)
    }

    fn get_evidence(&self, id: &str) -> CredenceResult<Option<Evidence>> {
        self.inner.get_evidence(id)
    }

    fn evidence_for(&self, assertion_id: &str) -> CredenceResult<Vec<Evidence>> {
        self.inner.evidence_for(assertion_id)
    }
}

impl<S: IChallengeStore> IChallengeStore for SlowAssertionReads<S> {
    fn insert_challenge(&self, challenge: &Challenge) -> CredenceResult<()> {
        self.inner.insert_challenge(challenge)
    }

    fn get_challenge(&self, id: &str) -> CredenceResult<Option<Challenge>> {
        self.inner.get_challenge(id)
    }

    fn save_challenge(&self, challenge: &Challenge, expected_version: u64) -> CredenceResult<u64> {
        self.inner.save_challenge(challenge, expected_version)
    }

    fn challenges_for(&self, assertion_id: &str) -> CredenceResult<Vec<Challenge>> {
        self.inner.challenges_for(assertion_id)
    }

    fn open_challenges(&self) -> CredenceResult<Vec<Challenge>> {
        self.inner.open_challenges()
    }
}

impl<S: IPromotionLedger> IPromotionLedger for SlowAssertionReads<S> {
    fn events_for(&self, assertion_id: &str) -> CredenceResult<Vec<PromotionEvent>> {
        self.inner.events_for(assertion_id)
    }

    fn all_events(&self) -> CredenceResult<Vec<PromotionEvent>> {
        self.inner.all_events()
    }
}
