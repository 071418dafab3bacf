//! The three tiers behind one index.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info, instrument};

use credence_core::clock::Clock;
use credence_core::config::DedupConfig;
use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::models::{
    DegradationEvent, DuplicateCandidate, DuplicateCheck, DuplicateMatch, FingerprintOwner, FingerprintRecord,
    FingerprintValue, HashKind, MatchTier, Payload, Recommendation,
};
use credence_core::traits::IEmbeddingProvider;
use credence_observability::tracing_setup::events;
use credence_observability::{DegradationTracker, TrackedDegradation};

use crate::canonical::{content_hash, exact_key, shingles};
use crate::exact::{ExactClaim, ExactIndex};
use crate::near::{dhash, MinHashIndex, MinHasher, PerceptualIndex};
use crate::semantic::{EmbedOutcome, EmbeddingGate, SemanticIndex};
use crate::SEMANTIC_COMPONENT;

/// Which near-tier signal a payload yields.
enum NearSignal {
    Text(Vec<u64>),
    Binary(u64),
    None,
}

/// Duplicate index over assertions and evidence.
///
/// The exact tier is strongly consistent. The near and semantic tiers apply
/// only to unscoped candidates (assertions); evidence is deduplicated by
/// exact citation within its assertion.
pub struct DedupIndex {
    config: DedupConfig,
    exact: ExactIndex,
    text: MinHashIndex,
    binary: PerceptualIndex,
    semantic: SemanticIndex,
    embedder: EmbeddingGate,
    /// Exact keys per owner, for removal.
    owners: DashMap<FingerprintOwner, Vec<String>>,
    degradation: Mutex<DegradationTracker>,
    clock: Arc<dyn Clock>,
}

impl DedupIndex {
    pub fn new(config: DedupConfig, clock: Arc<dyn Clock>) -> CredenceResult<Self> {
        let hasher = MinHasher::new(config.minhash_permutations, config.minhash_bands)?;
        Ok(Self {
            exact: ExactIndex::new(),
            text: MinHashIndex::new(hasher),
            binary: PerceptualIndex::new(),
            semantic: SemanticIndex::new(),
            embedder: EmbeddingGate::disabled(),
            owners: DashMap::new(),
            degradation: Mutex::new(DegradationTracker::new()),
            clock,
            config,
        })
    }

    /// Back the semantic tier with `provider`.
    pub fn with_embedder(mut self, provider: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedder = EmbeddingGate::new(
            Some(provider),
            Duration::from_millis(self.config.semantic_timeout_ms),
            self.config.semantic_enabled,
        );
        self
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Run the tiers cheapest first and stop at the first that matches.
    /// Read-only: nothing is indexed.
    #[instrument(skip_all, fields(kind = candidate.payload.kind(), scoped = candidate.scope.is_some()))]
    pub async fn check_duplicate(&self, candidate: &DuplicateCandidate) -> CredenceResult<DuplicateCheck> {
        validate(candidate)?;

        let key = self.key_for(candidate);
        if let Some(id) = self.exact.lookup(&key) {
            return Ok(self.hit(vec![(id, 1.0)], MatchTier::Exact, Recommendation::Merge));
        }
        if candidate.scope.is_some() {
            return Ok(DuplicateCheck::unique());
        }

        let near = match self.near_signal(&candidate.payload) {
            NearSignal::Text(sig) => self.text.query(&sig, self.config.near_duplicate_threshold),
            NearSignal::Binary(hash) => self.binary.query(hash, self.config.perceptual_threshold),
            NearSignal::None => Vec::new(),
        };
        if !near.is_empty() {
            return Ok(self.hit(near, MatchTier::NearDuplicate, Recommendation::Link));
        }

        let Some(text) = candidate.payload.as_text() else {
            return Ok(DuplicateCheck::unique());
        };
        match self.embed(&text).await {
            EmbedOutcome::Disabled => Ok(DuplicateCheck::unique()),
            EmbedOutcome::Degraded { reason } => Ok(DuplicateCheck {
                degraded: true,
                degraded_reason: Some(reason),
                ..DuplicateCheck::unique()
            }),
            EmbedOutcome::Vector(v) => {
                let hits = self.semantic.nearest(&v, self.config.semantic_threshold);
                if hits.is_empty() {
                    Ok(DuplicateCheck::unique())
                } else {
                    Ok(self.hit(hits, MatchTier::Semantic, Recommendation::Review))
                }
            }
        }
    }

    /// Atomically take the exact key for `candidate`. `allocate` runs only
    /// if no one holds it, so a duplicate never consumes an id.
    pub fn claim_exact(
        &self,
        candidate: &DuplicateCandidate,
        allocate: impl FnOnce() -> String,
    ) -> CredenceResult<ExactClaim> {
        validate(candidate)?;
        let key = self.key_for(candidate);
        let claim = self.exact.claim(key.clone(), allocate);
        match &claim {
            ExactClaim::Claimed { id } => {
                debug!(id = %id, "exact key claimed");
            }
            ExactClaim::Existing { id } => {
                events::duplicate_detected("exact", id, 1.0, "merge");
            }
        }
        Ok(claim)
    }

    /// Fingerprint `candidate` and index it under `owner`. Returns the
    /// records to persist with the owner. A semantic failure is recorded as
    /// a degradation and the semantic record is left out.
    ///
    /// `Conflict` if another owner already holds the exact key.
    #[instrument(skip_all, fields(owner = owner.id()))]
    pub async fn register(
        &self,
        owner: FingerprintOwner,
        candidate: &DuplicateCandidate,
    ) -> CredenceResult<Vec<FingerprintRecord>> {
        validate(candidate)?;
        let key = self.key_for(candidate);
        self.exact.bind(key.clone(), owner.id()).map_err(|holder| {
            CredenceError::Conflict {
                resource: format!("exact:{key}"),
                reason: format!("content already registered to {holder}"),
            }
        })?;

        let mut records = vec![FingerprintRecord {
            owner: owner.clone(),
            kind: HashKind::Exact,
            value: FingerprintValue::Hash(key.clone()),
        }];
        self.owners.entry(owner.clone()).or_default().push(key);

        if candidate.scope.is_none() {
            match self.near_signal(&candidate.payload) {
                NearSignal::Text(sig) => {
                    self.text.insert(owner.id(), sig.clone());
                    records.push(record(&owner, HashKind::NearDuplicate, FingerprintValue::Signature(sig)));
                }
                NearSignal::Binary(hash) => {
                    self.binary.insert(owner.id(), hash);
                    records.push(record(
                        &owner,
                        HashKind::NearDuplicate,
                        FingerprintValue::Hash(format!("{hash:016x}")),
                    ));
                }
                NearSignal::None => {}
            }
            if let Some(text) = candidate.payload.as_text() {
                if let EmbedOutcome::Vector(v) = self.embed(&text).await {
                    self.semantic.insert(owner.id(), v.clone());
                    records.push(record(&owner, HashKind::Semantic, FingerprintValue::Vector(v)));
                }
            }
        }

        debug!(records = records.len(), "registered fingerprints");
        Ok(records)
    }

    /// Undo a single [`register`](Self::register) of `candidate` by `owner`,
    /// leaving any other key `owner` holds in place.
    pub fn release(&self, owner: &FingerprintOwner, candidate: &DuplicateCandidate) -> bool {
        let key = self.key_for(candidate);
        let released = self.exact.release(&key, owner.id());
        if let Some(mut keys) = self.owners.get_mut(owner) {
            keys.retain(|k| k != &key);
        }
        self.owners.remove_if(owner, |_, keys| keys.is_empty());
        released
    }

    /// Exact-tier record for `candidate`, computed without touching the index.
    pub fn exact_record(&self, owner: FingerprintOwner, candidate: &DuplicateCandidate) -> FingerprintRecord {
        record(&owner, HashKind::Exact, FingerprintValue::Hash(self.key_for(candidate)))
    }

    /// Drop every fingerprint of `owner`. Returns whether anything was held.
    pub fn remove(&self, owner: &FingerprintOwner) -> bool {
        let keys = self.owners.remove(owner).map(|(_, keys)| keys).unwrap_or_default();
        for key in &keys {
            self.exact.release(key, owner.id());
        }
        let near = self.text.remove(owner.id()) | self.binary.remove(owner.id());
        let semantic = self.semantic.remove(owner.id());
        !keys.is_empty() || near || semantic
    }

    /// Replace the whole index with persisted records. Returns how many
    /// records were loaded.
    pub fn rebuild(&self, records: impl IntoIterator<Item = FingerprintRecord>) -> CredenceResult<usize> {
        self.exact.clear();
        self.text.clear();
        self.binary.clear();
        self.semantic.clear();
        self.owners.clear();

        let mut loaded = 0;
        for r in records {
            let id = r.owner.id().to_string();
            match (r.kind, r.value) {
                (HashKind::Exact, FingerprintValue::Hash(key)) => {
                    self.exact.bind(key.clone(), &id).map_err(|holder| CredenceError::Conflict {
                        resource: format!("exact:{key}"),
                        reason: format!("records for {id} and {holder} share an exact key"),
                    })?;
                    self.owners.entry(r.owner).or_default().push(key);
                }
                (HashKind::NearDuplicate, FingerprintValue::Signature(sig)) => self.text.insert(&id, sig),
                (HashKind::NearDuplicate, FingerprintValue::Hash(hex)) => {
                    let hash = u64::from_str_radix(&hex, 16).map_err(|e| {
                        CredenceError::ValidationError(format!("bad perceptual hash for {id}: {e}"))
                    })?;
                    self.binary.insert(&id, hash);
                }
                (HashKind::Semantic, FingerprintValue::Vector(v)) => self.semantic.insert(&id, v),
                (kind, _) => {
                    return Err(CredenceError::ValidationError(format!(
                        "fingerprint for {id} has a value that does not fit kind {kind:?}"
                    )))
                }
            }
            loaded += 1;
        }
        info!(loaded, "dedup index rebuilt");
        Ok(loaded)
    }

    /// Number of owners holding an exact key.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.tracker().is_degraded(SEMANTIC_COMPONENT)
    }

    pub fn degradation_history(&self) -> Vec<TrackedDegradation> {
        self.tracker().events()
    }

    fn key_for(&self, candidate: &DuplicateCandidate) -> String {
        exact_key(candidate.scope.as_deref(), &content_hash(&candidate.payload))
    }

    fn near_signal(&self, payload: &Payload) -> NearSignal {
        match payload {
            Payload::Binary { bytes, .. } => dhash(bytes).map_or(NearSignal::None, NearSignal::Binary),
            other => match other.as_text() {
                Some(text) => {
                    let set = shingles(&text, self.config.shingle_size);
                    if set.is_empty() {
                        NearSignal::None
                    } else {
                        NearSignal::Text(self.text.hasher().signature(&set))
                    }
                }
                None => NearSignal::None,
            },
        }
    }

    /// Embed and keep the degradation log in step with the outcome.
    async fn embed(&self, text: &str) -> EmbedOutcome {
        let outcome = self.embedder.embed(text).await;
        match &outcome {
            EmbedOutcome::Degraded { reason } => {
                self.tracker().record(DegradationEvent::new(
                    SEMANTIC_COMPONENT,
                    reason.as_str(),
                    "semantic tier skipped",
                    self.clock.now(),
                ));
            }
            EmbedOutcome::Vector(_) => {
                let mut tracker = self.tracker();
                if tracker.is_degraded(SEMANTIC_COMPONENT) {
                    tracker.mark_recovered(SEMANTIC_COMPONENT, self.clock.now());
                }
            }
            EmbedOutcome::Disabled => {}
        }
        outcome
    }

    fn hit(&self, hits: Vec<(String, f64)>, tier: MatchTier, recommendation: Recommendation) -> DuplicateCheck {
        let matches: Vec<DuplicateMatch> = hits
            .into_iter()
            .map(|(id, score)| DuplicateMatch { id, tier, score })
            .collect();
        if let Some(best) = matches.first() {
            events::duplicate_detected(tier_str(tier), &best.id, best.score, recommendation_str(recommendation));
        }
        DuplicateCheck {
            is_duplicate: true,
            matches,
            recommendation,
            degraded: false,
            degraded_reason: None,
        }
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.degradation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn validate(candidate: &DuplicateCandidate) -> CredenceResult<()> {
    if candidate.payload.is_empty() {
        return Err(CredenceError::ValidationError(format!(
            "empty {} payload",
            candidate.payload.kind()
        )));
    }
    Ok(())
}

fn record(owner: &FingerprintOwner, kind: HashKind, value: FingerprintValue) -> FingerprintRecord {
    FingerprintRecord {
        owner: owner.clone(),
        kind,
        value,
    }
}

fn tier_str(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::Exact => "exact",
        MatchTier::NearDuplicate => "near_duplicate",
        MatchTier::Semantic => "semantic",
    }
}

fn recommendation_str(r: Recommendation) -> &'static str {
    match r {
        Recommendation::Merge => "merge",
        Recommendation::Link => "link",
        Recommendation::Review => "review",
        Recommendation::Create => "create",
    }
}
