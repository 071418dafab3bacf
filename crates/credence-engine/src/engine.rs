//! CredenceEngine: owns every component and the store they share.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use credence_challenge::{ChallengeEngine, Tally, VoteReceipt};
use credence_core::clock::Clock;
use credence_core::config::CredenceConfig;
use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::gate::ReviewGate;
use credence_core::models::{
    Assertion, Challenge, ChallengeOpened, ChallengeOutcome, CredenceEvent, DuplicateCandidate, EligibilityReport,
    FingerprintOwner, Payload, PromotionEvent, PromotionRequest, VoteChoice,
};
use credence_core::traits::{
    IAssertionStore, IChallengeStore, ICredenceStore, IEvidenceStore, IPromotionLedger, IReputationLookup,
};
use credence_core::weight::Weight;
use credence_dedup::DedupIndex;
use credence_promotion::PromotionEvaluator;
use credence_scoring::{CredibilityScorer, WeightCache};
use credence_storage::{MemoryStore, SqliteStore};
use tokio::sync::broadcast;

use crate::bus::EventBus;
use crate::options::EngineOptions;

pub struct CredenceEngine {
    pub(crate) store: Arc<dyn ICredenceStore>,
    pub(crate) scorer: CredibilityScorer,
    pub(crate) cache: WeightCache,
    pub(crate) challenges: ChallengeEngine,
    pub(crate) dedup: DedupIndex,
    pub(crate) promotion: PromotionEvaluator,
    /// Shared with `challenges` and `promotion`; evidence inserts take it too.
    pub(crate) gate: Arc<ReviewGate>,
    pub(crate) bus: EventBus,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: CredenceConfig,
}

impl CredenceEngine {
    /// Wire an engine over `store`. The dedup index is rebuilt from the
    /// fingerprints already persisted there.
    pub fn new<S>(store: Arc<S>, reputation: Arc<dyn IReputationLookup>, options: EngineOptions) -> CredenceResult<Self>
    where
        S: ICredenceStore + 'static,
    {
        let EngineOptions {
            config,
            clock,
            embedder,
            event_capacity,
        } = options;
        config.validate()?;

        let challenge_store: Arc<dyn IChallengeStore> = store.clone();
        let assertion_store: Arc<dyn IAssertionStore> = store.clone();
        let store: Arc<dyn ICredenceStore> = store;
        let gate = Arc::new(ReviewGate::new());
        let scorer = CredibilityScorer::new(config.scoring.clone());

        let challenges = ChallengeEngine::new(
            challenge_store,
            assertion_store,
            reputation,
            Arc::clone(&clock),
            Arc::clone(&gate),
            &config.challenge,
        );
        let promotion = PromotionEvaluator::new(
            Arc::clone(&store),
            scorer.clone(),
            Arc::clone(&gate),
            Arc::clone(&clock),
            config.promotion.clone(),
        );
        let mut dedup = DedupIndex::new(config.dedup.clone(), Arc::clone(&clock))?;
        if let Some(embedder) = embedder {
            dedup = dedup.with_embedder(embedder);
        }

        let engine = Self {
            cache: WeightCache::new(config.scoring.cache_capacity),
            store,
            scorer,
            challenges,
            dedup,
            promotion,
            gate,
            bus: EventBus::new(event_capacity),
            clock,
            config,
        };
        engine.rebuild_dedup()?;
        Ok(engine)
    }

    /// Engine over a SQLite file, migrated on open.
    pub fn open(path: &Path, reputation: Arc<dyn IReputationLookup>, options: EngineOptions) -> CredenceResult<Self> {
        Self::new(Arc::new(SqliteStore::open(path)?), reputation, options)
    }

    /// Engine over a fresh in-memory store.
    pub fn in_memory(reputation: Arc<dyn IReputationLookup>, options: EngineOptions) -> CredenceResult<Self> {
        Self::new(Arc::new(MemoryStore::new()), reputation, options)
    }

    pub fn config(&self) -> &CredenceConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CredenceEvent> {
        self.bus.subscribe()
    }

    pub fn assertion(&self, id: &str) -> CredenceResult<Assertion> {
        self.store
            .get_assertion(id)?
            .ok_or_else(|| CredenceError::AssertionNotFound { id: id.to_string() })
    }

    /// Current weight, served from the cache when it holds this assertion.
    pub fn weight(&self, id: &str) -> CredenceResult<Weight> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(cached.weight);
        }
        let assertion = self.assertion(id)?;
        self.cache.insert_if_newer(id, assertion.version, assertion.weight);
        Ok(assertion.weight)
    }

    #[instrument(skip(self, reason))]
    pub fn open_challenge(
        &self,
        assertion_id: &str,
        topic: &str,
        raised_by: &str,
        reason: &str,
    ) -> CredenceResult<Challenge> {
        let challenge = self.challenges.open_challenge(assertion_id, topic, raised_by, reason)?;
        self.bus.publish(CredenceEvent::ChallengeOpened(ChallengeOpened {
            challenge_id: challenge.id.clone(),
            assertion_id: challenge.assertion_id.clone(),
            topic: challenge.topic.clone(),
            deadline: challenge.deadline,
        }));
        Ok(challenge)
    }

    pub fn cast_vote(
        &self,
        challenge_id: &str,
        voter_id: &str,
        choice: VoteChoice,
        confidence: f64,
    ) -> CredenceResult<VoteReceipt> {
        let receipt = self.challenges.cast_vote(challenge_id, voter_id, choice, confidence)?;
        if let Some(outcome) = &receipt.outcome {
            self.on_resolved(outcome);
        }
        Ok(receipt)
    }

    pub fn resolve_challenge(&self, challenge_id: &str, actor: &str) -> CredenceResult<ChallengeOutcome> {
        let outcome = self.challenges.resolve(challenge_id, actor)?;
        self.on_resolved(&outcome);
        Ok(outcome)
    }

    /// Resolve every challenge that is due. Safe to call at any frequency.
    pub fn sweep_deadlines(&self) -> CredenceResult<Vec<ChallengeOutcome>> {
        let resolved = self.challenges.sweep()?;
        for outcome in &resolved {
            self.on_resolved(outcome);
        }
        Ok(resolved)
    }

    pub fn challenge(&self, challenge_id: &str) -> CredenceResult<Challenge> {
        self.challenges.get(challenge_id)
    }

    pub fn tally(&self, challenge_id: &str) -> CredenceResult<Tally> {
        self.challenges.tally(challenge_id)
    }

    pub fn challenges_for(&self, assertion_id: &str) -> CredenceResult<Vec<Challenge>> {
        self.challenges.challenges_for(assertion_id)
    }

    pub fn evaluate_eligibility(&self, assertion_id: &str) -> CredenceResult<EligibilityReport> {
        self.promotion.evaluate_eligibility(assertion_id)
    }

    pub fn promote(&self, assertion_id: &str, request: PromotionRequest) -> CredenceResult<PromotionEvent> {
        let event = self.promotion.promote(assertion_id, request)?;
        let published = CredenceEvent::AssertionPromoted(event.clone());
        self.cache.apply_event(&published);
        self.bus.publish(published);
        Ok(event)
    }

    /// Whole promotion ledger in sequence order.
    pub fn ledger(&self) -> CredenceResult<Vec<PromotionEvent>> {
        self.store.all_events()
    }

    /// Whether the semantic dedup tier is currently degraded.
    pub fn is_degraded(&self) -> bool {
        self.dedup.is_degraded()
    }

    fn rebuild_dedup(&self) -> CredenceResult<()> {
        let mut records = Vec::new();
        for id in self.store.assertion_ids()? {
            let Some(assertion) = self.store.get_assertion(&id)? else {
                continue;
            };
            for evidence in self.store.evidence_for(&id)? {
                if evidence.citation().trim().is_empty() {
                    continue;
                }
                let candidate =
                    DuplicateCandidate::scoped(Payload::Text(evidence.citation().to_string()), id.as_str());
                records.push(
                    self.dedup
                        .exact_record(FingerprintOwner::Evidence(evidence.id().to_string()), &candidate),
                );
            }
            records.extend(assertion.fingerprints);
        }
        if !records.is_empty() {
            let loaded = self.dedup.rebuild(records)?;
            info!(loaded, "restored dedup fingerprints from store");
        }
        Ok(())
    }
}
