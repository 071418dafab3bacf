use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use chrono::Duration;
use credence_core::errors::{CredenceError, ErrorKind};
use credence_core::models::{
    ChallengeState, CredenceEvent, Evidence, MatchTier, MethodologyChecklist, Payload, PromotionRequest,
    Recommendation, ScoreTrigger, VoteChoice,
};
use credence_core::traits::{IAssertionStore, IEvidenceStore, IPromotionLedger};
use credence_engine::{CredenceEngine, EngineOptions};
use credence_storage::MemoryStore;
use test_fixtures::{
    base_time, verified_methodology, FailingEmbedder, FixedClock, SlowAssertionReads, StaticReputation,
};
use tokio::sync::broadcast;

struct Harness {
    engine: Arc<CredenceEngine>,
    store: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
}

fn reputation() -> Arc<StaticReputation> {
    Arc::new(
        StaticReputation::new()
            .with("alice", 100.0)
            .with("bob", 25.0)
            .with("carol", 49.0),
    )
}

fn harness() -> Harness {
    harness_with(EngineOptions::default())
}

fn harness_with(options: EngineOptions) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(base_time()));
    let engine = CredenceEngine::new(store.clone(), reputation(), options.with_clock(clock.clone())).unwrap();
    Harness {
        engine: Arc::new(engine),
        store,
        clock,
    }
}

fn text(s: &str) -> Payload {
    Payload::Text(s.to_string())
}

fn drain(rx: &mut broadcast::Receiver<CredenceEvent>) -> Vec<CredenceEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

async fn strong_assertion(h: &Harness) -> String {
    let submitted = h
        .engine
        .submit_assertion(text("water boils at 100C at sea level"), verified_methodology())
        .await
        .unwrap();
    for (i, credibility) in [0.95, 0.9, 0.92, 0.97].into_iter().enumerate() {
        let e = Evidence::supporting(format!("e-{i}"), &submitted.assertion_id, credibility, base_time());
        h.engine.submit_evidence(e).await.unwrap();
    }
    submitted.assertion_id
}

#[tokio::test]
async fn three_supporting_sources_lift_the_weight() {
    let h = harness();
    let mut rx = h.engine.subscribe();
    let id = h
        .engine
        .submit_assertion(text("the moon orbits the earth"), MethodologyChecklist::default())
        .await
        .unwrap()
        .assertion_id;
    assert!((h.engine.weight(&id).unwrap().value() - 0.5).abs() < 1e-9);

    let mut last_version = 0;
    for (i, credibility) in [0.9, 0.8, 0.7].into_iter().enumerate() {
        let e = Evidence::supporting(format!("s-{i}"), &id, credibility, base_time());
        let receipt = h.engine.submit_evidence(e).await.unwrap();
        assert!(receipt.duplicate_of.is_none());
        assert!(receipt.version > last_version);
        last_version = receipt.version;
    }

    let weight = h.engine.weight(&id).unwrap().value();
    assert!(weight > 0.75, "weight {weight}");
    assert!(weight < 0.9, "unpromoted weight must stay below the high band");
    assert_eq!(h.engine.assertion(&id).unwrap().weight.value(), weight);

    let scored: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            CredenceEvent::EvidenceScored(s) => Some(s),
            _ => None,
        })
        .collect();
    assert_eq!(scored.len(), 3);
    assert_eq!(scored[2].evidence_count, 3);
    assert_eq!(scored[2].version, last_version);
    assert!(matches!(&scored[0].trigger, ScoreTrigger::Evidence { evidence_id } if evidence_id == "s-0"));
}

#[tokio::test]
async fn byte_identical_submission_merges_without_new_id() {
    let h = harness();
    let first = h
        .engine
        .submit_assertion(text("Paris is the capital of France"), MethodologyChecklist::default())
        .await
        .unwrap();
    assert!(first.created);

    let second = h
        .engine
        .submit_assertion(text("Paris is the capital of France"), MethodologyChecklist::default())
        .await
        .unwrap();
    assert!(!second.created);
    assert!(second.check.is_duplicate);
    assert_eq!(second.check.recommendation, Recommendation::Merge);
    assert_eq!(second.assertion_id, first.assertion_id);
    assert_eq!(h.store.assertion_ids().unwrap().len(), 1);
}

#[tokio::test]
async fn racing_identical_submissions_create_one_assertion() {
    let h = harness();
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&h.engine);
        tasks.push(tokio::spawn(async move {
            engine
                .submit_assertion(text("light travels at 299792458 m/s"), MethodologyChecklist::default())
                .await
                .unwrap()
        }));
    }
    let mut ids = Vec::new();
    let mut created = 0;
    for t in tasks {
        let s = t.await.unwrap();
        created += usize::from(s.created);
        ids.push(s.assertion_id);
    }
    assert_eq!(created, 1);
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(h.store.assertion_ids().unwrap().len(), 1);
}

#[tokio::test]
async fn supermajority_resolution_rescores_the_assertion() {
    let h = harness();
    let id = h
        .engine
        .submit_assertion(text("pluto is a planet"), MethodologyChecklist::default())
        .await
        .unwrap()
        .assertion_id;
    let mut rx = h.engine.subscribe();

    let challenge = h.engine.open_challenge(&id, "classification", "carol", "IAU 2006").unwrap();
    let first = h.engine.cast_vote(&challenge.id, "alice", VoteChoice::Sustain, 1.0).unwrap();
    assert!(first.outcome.is_none(), "review period has not elapsed");

    h.clock.advance(Duration::days(2));
    let second = h.engine.cast_vote(&challenge.id, "bob", VoteChoice::Sustain, 1.0).unwrap();
    let outcome = second.outcome.expect("second vote crosses the supermajority");
    assert_eq!(outcome.state, ChallengeState::ResolvedSustained);
    assert!((outcome.consensus_ratio - 1.0).abs() < 1e-9);
    assert!((outcome.total_weight - 15.0).abs() < 1e-9);

    let events = drain(&mut rx);
    let names: Vec<_> = events.iter().map(|e| e.name()).collect();
    assert_eq!(names, ["challenge_opened", "challenge_resolved", "evidence_scored"]);
    match &events[2] {
        CredenceEvent::EvidenceScored(s) => {
            assert!(
                matches!(&s.trigger, ScoreTrigger::ChallengeResolution { challenge_id } if *challenge_id == challenge.id)
            );
            assert!(s.weight.value() < 0.5, "a sustained challenge lowers the weight");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(h.engine.weight(&id).unwrap().value() < 0.5);
}

#[tokio::test]
async fn open_challenge_blocks_promotion_until_resolved() {
    let h = harness();
    let id = strong_assertion(&h).await;
    h.clock.advance(Duration::days(1));

    let challenge = h.engine.open_challenge(&id, "accuracy", "carol", "altitude").unwrap();
    let report = h.engine.evaluate_eligibility(&id).unwrap();
    assert!(!report.eligible);
    assert!(!report.criteria.open_challenges.met);
    assert!(report.criteria.methodology_completion.met);
    assert!(report.criteria.evidence_quality.met);

    let err = h.engine.promote(&id, PromotionRequest::automatic("")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let outcome = h.engine.resolve_challenge(&challenge.id, "moderator").unwrap();
    assert_eq!(outcome.state, ChallengeState::ClosedExpired);
    assert!(h.engine.evaluate_eligibility(&id).unwrap().eligible);
}

#[tokio::test]
async fn promotion_freezes_the_weight_for_good() {
    let h = harness();
    let id = strong_assertion(&h).await;
    let mut rx = h.engine.subscribe();

    let event = h.engine.promote(&id, PromotionRequest::automatic("")).unwrap();
    assert_eq!(event.sequence, 1);
    assert!(event.final_weight.value() >= 0.9);
    assert!(event.justification.starts_with("automatic"));
    assert_eq!(drain(&mut rx).iter().map(|e| e.name()).collect::<Vec<_>>(), ["assertion_promoted"]);

    let frozen = h.engine.weight(&id).unwrap();
    assert_eq!(frozen, event.final_weight);
    assert!(h.engine.assertion(&id).unwrap().is_verified());

    let late = Evidence::refuting("late", &id, 1.0, base_time());
    let err = h.engine.submit_evidence(late).await.unwrap_err();
    assert!(matches!(err, CredenceError::ImmutabilityViolation { .. }));

    let err = h.engine.open_challenge(&id, "accuracy", "carol", "too late").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ImmutabilityViolation);

    let err = h.engine.promote(&id, PromotionRequest::automatic("again")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ImmutabilityViolation);

    h.clock.advance(Duration::days(365));
    assert_eq!(h.engine.weight(&id).unwrap(), frozen);
    assert_eq!(h.engine.ledger().unwrap().len(), 1);
    assert!(h.store.get_evidence("late").unwrap().is_none());
}

#[tokio::test]
async fn repeated_citation_is_reported_not_stored() {
    let h = harness();
    let a = h
        .engine
        .submit_assertion(text("smoking causes cancer"), MethodologyChecklist::default())
        .await
        .unwrap()
        .assertion_id;
    let b = h
        .engine
        .submit_assertion(text("exercise lowers blood pressure"), MethodologyChecklist::default())
        .await
        .unwrap()
        .assertion_id;

    let cite = "Doll & Hill, BMJ 1950";
    let first = h
        .engine
        .submit_evidence(Evidence::supporting("ev-1", &a, 0.9, base_time()).with_citation(cite))
        .await
        .unwrap();
    let again = h
        .engine
        .submit_evidence(Evidence::supporting("ev-2", &a, 0.9, base_time()).with_citation(format!("  {cite} ")))
        .await
        .unwrap();
    assert_eq!(again.duplicate_of.as_deref(), Some("ev-1"));
    assert_eq!(again.version, first.version);
    assert_eq!(h.store.evidence_for(&a).unwrap().len(), 1);

    let elsewhere = h
        .engine
        .submit_evidence(Evidence::supporting("ev-3", &b, 0.9, base_time()).with_citation(cite))
        .await
        .unwrap();
    assert!(elsewhere.duplicate_of.is_none());
}

#[tokio::test]
async fn failed_filing_under_a_reused_id_keeps_the_first_citation() {
    let h = harness();
    let a = h
        .engine
        .submit_assertion(text("smoking causes cancer"), MethodologyChecklist::default())
        .await
        .unwrap()
        .assertion_id;

    h.engine
        .submit_evidence(Evidence::supporting("ev-1", &a, 0.9, base_time()).with_citation("Doll & Hill, BMJ 1950"))
        .await
        .unwrap();
    let err = h
        .engine
        .submit_evidence(Evidence::supporting("ev-1", &a, 0.8, base_time()).with_citation("Wynder, JAMA 1950"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let again = h
        .engine
        .submit_evidence(Evidence::supporting("ev-2", &a, 0.9, base_time()).with_citation("Doll & Hill, BMJ 1950"))
        .await
        .unwrap();
    assert_eq!(again.duplicate_of.as_deref(), Some("ev-1"));
    assert_eq!(h.store.evidence_for(&a).unwrap().len(), 1);

    // The rejected citation was never kept, so it can still be filed.
    let other = h
        .engine
        .submit_evidence(Evidence::supporting("ev-3", &a, 0.8, base_time()).with_citation("Wynder, JAMA 1950"))
        .await
        .unwrap();
    assert!(other.duplicate_of.is_none());
    assert_eq!(h.store.evidence_for(&a).unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn evidence_cannot_land_after_a_racing_freeze() {
    let store = Arc::new(MemoryStore::new());
    let slow = Arc::new(SlowAssertionReads::new(store.clone()));
    let clock = Arc::new(FixedClock::new(base_time()));
    let engine = Arc::new(
        CredenceEngine::new(slow.clone(), reputation(), EngineOptions::default().with_clock(clock.clone())).unwrap(),
    );
    let h = Harness {
        engine: Arc::clone(&engine),
        store: store.clone(),
        clock,
    };
    let id = strong_assertion(&h).await;

    slow.set_delay(StdDuration::from_millis(300));
    let promoter = {
        let engine = Arc::clone(&engine);
        let id = id.clone();
        thread::spawn(move || {
            // Starts while the evidence's first writable check is still reading.
            thread::sleep(StdDuration::from_millis(100));
            engine.promote(&id, PromotionRequest::automatic(""))
        })
    };
    let late = Evidence::supporting("late", &id, 0.9, base_time()).with_citation("late study");
    let filed = engine.submit_evidence(late).await;
    let promoted = promoter.join().unwrap();

    assert!(promoted.is_ok());
    assert_eq!(filed.unwrap_err().kind(), ErrorKind::ImmutabilityViolation);
    assert!(store.get_evidence("late").unwrap().is_none());
    assert_eq!(store.evidence_for(&id).unwrap().len(), 4);
    assert_eq!(store.all_events().unwrap().len(), 1);
}

#[tokio::test]
async fn near_duplicate_keeps_its_review_flag() {
    let h = harness();
    let image: Vec<u8> = (0..4096).map(|i| (128.0 + 100.0 * (i as f64 / 150.0).sin()) as u8).collect();
    let brighter: Vec<u8> = image.iter().map(|b| b + 3).collect();
    let binary = |bytes: Vec<u8>| Payload::Binary {
        media_type: "image/raw".into(),
        bytes,
    };

    let original = h
        .engine
        .submit_assertion(binary(image), MethodologyChecklist::default())
        .await
        .unwrap();
    let variant = h
        .engine
        .submit_assertion(binary(brighter), MethodologyChecklist::default())
        .await
        .unwrap();
    assert!(variant.created);
    assert_eq!(variant.check.recommendation, Recommendation::Link);

    let stored = h.engine.assertion(&variant.assertion_id).unwrap();
    assert!(stored.flagged_for_review());
    assert_eq!(stored.review_matches, variant.check.matches);
    assert_eq!(stored.review_matches[0].id, original.assertion_id);
    assert_eq!(stored.review_matches[0].tier, MatchTier::NearDuplicate);
    assert!(!h.engine.assertion(&original.assertion_id).unwrap().flagged_for_review());
}

#[tokio::test]
async fn evidence_for_unknown_assertion_is_rejected() {
    let h = harness();
    let err = h
        .engine
        .submit_evidence(Evidence::supporting("ev-x", "missing", 0.5, base_time()))
        .await
        .unwrap_err();
    assert!(matches!(err, CredenceError::InvalidEvidence { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = h
        .engine
        .submit_evidence(Evidence::supporting("ev-y", "missing", 1.5, base_time()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn failing_embedder_degrades_but_does_not_block_ingestion() {
    let h = harness_with(EngineOptions::default().with_embedder(Arc::new(FailingEmbedder)));
    let submitted = h
        .engine
        .submit_assertion(text("coffee improves focus"), MethodologyChecklist::default())
        .await
        .unwrap();
    assert!(submitted.created);
    assert!(submitted.check.degraded);
    assert!(submitted.check.degraded_reason.is_some());
    assert!(h.engine.is_degraded());
    assert!(h.engine.assertion(&submitted.assertion_id).is_ok());
}

#[tokio::test]
async fn sweeper_resolves_expired_challenges() {
    let h = harness();
    let id = h
        .engine
        .submit_assertion(text("the great wall is visible from orbit"), MethodologyChecklist::default())
        .await
        .unwrap()
        .assertion_id;
    let challenge = h.engine.open_challenge(&id, "accuracy", "carol", "it is not").unwrap();
    h.engine.cast_vote(&challenge.id, "bob", VoteChoice::Dismiss, 0.5).unwrap();
    let mut rx = h.engine.subscribe();

    h.clock.advance(Duration::days(8));
    let sweeper = h.engine.spawn_deadline_sweeper(StdDuration::from_millis(10));

    let resolved = tokio::time::timeout(StdDuration::from_secs(5), async {
        loop {
            if let Ok(CredenceEvent::ChallengeResolved(outcome)) = rx.recv().await {
                return outcome;
            }
        }
    })
    .await
    .expect("sweeper resolves within the timeout");
    sweeper.abort();

    assert_eq!(resolved.challenge_id, challenge.id);
    assert_eq!(resolved.state, ChallengeState::ResolvedDismissed);
    assert_eq!(h.engine.challenge(&challenge.id).unwrap().state, ChallengeState::ResolvedDismissed);
    assert!(h.engine.sweep_deadlines().unwrap().is_empty());
}

#[tokio::test]
async fn reopened_sqlite_engine_remembers_fingerprints() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credence.db");
    let clock = Arc::new(FixedClock::new(base_time()));
    let options = || EngineOptions::default().with_clock(clock.clone());

    let (id, weight) = {
        let engine = CredenceEngine::open(&path, reputation(), options()).unwrap();
        let id = engine
            .submit_assertion(text("vaccines prevent measles"), MethodologyChecklist::default())
            .await
            .unwrap()
            .assertion_id;
        engine
            .submit_evidence(Evidence::supporting("ev-1", &id, 0.9, base_time()).with_citation("CDC 2019"))
            .await
            .unwrap();
        (id.clone(), engine.weight(&id).unwrap())
    };

    let engine = CredenceEngine::open(&path, reputation(), options()).unwrap();
    assert_eq!(engine.weight(&id).unwrap(), weight);

    let again = engine
        .submit_assertion(text("vaccines prevent measles"), MethodologyChecklist::default())
        .await
        .unwrap();
    assert!(!again.created);
    assert_eq!(again.assertion_id, id);

    let near = engine
        .submit_assertion(text("vaccines prevent measles outbreaks"), MethodologyChecklist::default())
        .await
        .unwrap();
    assert!(near.created);

    let dup = engine
        .submit_evidence(Evidence::supporting("ev-2", &id, 0.9, base_time()).with_citation("CDC 2019"))
        .await
        .unwrap();
    assert_eq!(dup.duplicate_of.as_deref(), Some("ev-1"));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut options = EngineOptions::default();
    options.config.dedup.minhash_bands = 0;
    let err = CredenceEngine::in_memory(reputation(), options).err().expect("bad config");
    assert!(matches!(err, CredenceError::ConfigError(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
}
