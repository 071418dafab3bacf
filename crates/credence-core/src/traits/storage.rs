//! Persisted logical layout: assertions, evidence, challenges with their
//! votes, and the append-only promotion ledger.

use crate::errors::CredenceResult;
use crate::models::{Assertion, Challenge, Evidence, PromotionEvent};
use crate::weight::Weight;

pub trait IAssertionStore: Send + Sync {
    /// Insert a new assertion. `Conflict` if the id exists.
    fn insert_assertion(&self, assertion: &Assertion) -> CredenceResult<()>;

    fn get_assertion(&self, id: &str) -> CredenceResult<Option<Assertion>>;

    /// Write a recomputed weight if the stored version is `expected_version`.
    /// Returns the new version. `ImmutabilityViolation` on a frozen
    /// assertion, `Conflict` on a version mismatch.
    fn update_weight(&self, id: &str, weight: Weight, expected_version: u64) -> CredenceResult<u64>;

    /// Compare-and-set `immutable` from false to true, set the frozen weight
    /// and append `event` to the ledger, all at once. Returns `false` if the
    /// assertion was already frozen, in which case nothing is written.
    ///
    /// The only write path that may set `immutable`.
    fn freeze(&self, id: &str, event: &PromotionEvent) -> CredenceResult<bool>;

    fn assertion_ids(&self) -> CredenceResult<Vec<String>>;
}

pub trait IEvidenceStore: Send + Sync {
    /// `Conflict` if the evidence id exists.
    fn insert_evidence(&self, evidence: &Evidence) -> CredenceResult<()>;

    fn get_evidence(&self, id: &str) -> CredenceResult<Option<Evidence>>;

    /// All evidence for an assertion in submission order.
    fn evidence_for(&self, assertion_id: &str) -> CredenceResult<Vec<Evidence>>;
}

pub trait IChallengeStore: Send + Sync {
    /// `Conflict` if the challenge id exists.
    fn insert_challenge(&self, challenge: &Challenge) -> CredenceResult<()>;

    fn get_challenge(&self, id: &str) -> CredenceResult<Option<Challenge>>;

    /// Persist the challenge and its votes if the stored version is
    /// `expected_version`. Returns the new version; `Conflict` on mismatch.
    fn save_challenge(&self, challenge: &Challenge, expected_version: u64) -> CredenceResult<u64>;

    fn challenges_for(&self, assertion_id: &str) -> CredenceResult<Vec<Challenge>>;

    /// Every non-terminal challenge.
    fn open_challenges(&self) -> CredenceResult<Vec<Challenge>>;
}

/// Read side of the promotion ledger. Appends happen only through
/// [`IAssertionStore::freeze`].
pub trait IPromotionLedger: Send + Sync {
    fn events_for(&self, assertion_id: &str) -> CredenceResult<Vec<PromotionEvent>>;

    /// Whole ledger in sequence order.
    fn all_events(&self) -> CredenceResult<Vec<PromotionEvent>>;
}

/// Everything the engine persists.
pub trait ICredenceStore: IAssertionStore + IEvidenceStore + IChallengeStore + IPromotionLedger {}

impl<T> ICredenceStore for T where T: IAssertionStore + IEvidenceStore + IChallengeStore + IPromotionLedger {}
