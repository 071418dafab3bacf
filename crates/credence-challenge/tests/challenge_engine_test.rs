use std::sync::Arc;
use std::thread;

use chrono::Duration;
use credence_challenge::ChallengeEngine;
use credence_core::config::{ChallengeConfig, SupermajorityPolicy};
use credence_core::errors::{ChallengeError, CredenceError, ErrorKind};
use credence_core::gate::ReviewGate;
use credence_core::models::{ChallengeState, ResolutionTrigger, VoteChoice};
use credence_core::traits::{IAssertionStore, IChallengeStore};
use credence_core::weight::Weight;
use credence_storage::MemoryStore;
use test_fixtures::{base_time, load_fixture, text_assertion, FixedClock, StaticReputation, VotingScenario};

struct Harness {
    engine: ChallengeEngine,
    clock: Arc<FixedClock>,
    store: Arc<MemoryStore>,
    gate: Arc<ReviewGate>,
}

fn harness(reputation: StaticReputation, config: ChallengeConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    store.insert_assertion(&text_assertion("a-1", "water boils at 100C at sea level")).unwrap();
    let clock = Arc::new(FixedClock::new(base_time()));
    let gate = Arc::new(ReviewGate::new());
    let engine = ChallengeEngine::new(
        store.clone(),
        store.clone(),
        Arc::new(reputation),
        clock.clone(),
        Arc::clone(&gate),
        &config,
    );
    Harness {
        engine,
        clock,
        store,
        gate,
    }
}

fn voters() -> StaticReputation {
    StaticReputation::new()
        .with("v-100", 100.0)
        .with("v-25", 25.0)
        .with("v-16", 16.0)
        .with("v-zero", 0.0)
}

#[test]
fn unanimous_sustain_resolves_after_review_period() {
    let h = harness(voters(), ChallengeConfig::default());
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "altitude matters").unwrap();
    assert_eq!(c.state, ChallengeState::Open);

    // Inside the review period: no early resolution.
    let r1 = h.engine.cast_vote(&c.id, "v-100", VoteChoice::Sustain, 1.0).unwrap();
    assert!(r1.outcome.is_none());
    assert_eq!(r1.challenge.state, ChallengeState::Voting);

    h.clock.advance(Duration::days(2));
    let r2 = h.engine.cast_vote(&c.id, "v-25", VoteChoice::Sustain, 1.0).unwrap();
    let outcome = r2.outcome.expect("supermajority reached");
    assert_eq!(outcome.state, ChallengeState::ResolvedSustained);
    assert!((outcome.consensus_ratio - 1.0).abs() < 1e-12);
    assert!((outcome.total_weight - 15.0).abs() < 1e-12);
    assert_eq!(outcome.vote_count, 2);
    assert!(matches!(outcome.trigger, ResolutionTrigger::Supermajority { .. }));

    let stored = h.engine.get(&c.id).unwrap();
    assert!(stored.is_terminal());
    assert_eq!(stored.outcome, Some(outcome));
}

#[test]
fn strict_policy_holds_back_a_two_thirds_majority() {
    let config = ChallengeConfig {
        supermajority: SupermajorityPolicy::Strict,
        ..ChallengeConfig::default()
    };
    let h = harness(voters(), config);
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();
    h.clock.advance(Duration::days(2));
    h.engine.cast_vote(&c.id, "v-100", VoteChoice::Sustain, 1.0).unwrap();
    let r = h.engine.cast_vote(&c.id, "v-25", VoteChoice::Dismiss, 1.0).unwrap();
    assert!(r.outcome.is_none());
    assert_eq!(r.challenge.state, ChallengeState::Voting);
}

#[test]
fn revote_replaces_the_earlier_contribution() {
    let h = harness(voters(), ChallengeConfig::default());
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();

    h.engine.cast_vote(&c.id, "v-100", VoteChoice::Sustain, 1.0).unwrap();
    h.engine.cast_vote(&c.id, "v-25", VoteChoice::Sustain, 1.0).unwrap();
    let receipt = h.engine.cast_vote(&c.id, "v-100", VoteChoice::Dismiss, 0.5).unwrap();
    assert!(receipt.replaced);
    assert_eq!(receipt.challenge.votes.len(), 2);

    let t = h.engine.tally(&c.id).unwrap();
    assert_eq!(t.vote_count, 2);
    assert!((t.sustain_weight - 5.0).abs() < 1e-12);
    assert!((t.dismiss_weight - 5.0).abs() < 1e-12);
    assert!((t.consensus_ratio() - 0.5).abs() < 1e-12);
}

#[test]
fn golden_voting_scenarios_match_tally() {
    for name in ["voting_unanimous_sustain", "voting_split"] {
        let scenario: VotingScenario = load_fixture(&format!("scenarios/{name}.json"));
        let reputation = scenario
            .votes
            .iter()
            .fold(StaticReputation::new(), |r, v| r.with(&v.voter, v.reputation));
        let h = harness(reputation, ChallengeConfig::default());
        let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();
        for v in &scenario.votes {
            h.engine.cast_vote(&c.id, &v.voter, v.choice, v.confidence).unwrap();
        }
        let t = h.engine.tally(&c.id).unwrap();
        assert!((t.consensus_ratio() - scenario.expected_ratio).abs() < 1e-9, "{}", scenario.name);
        assert!((t.total_weight() - scenario.expected_total_weight).abs() < 1e-9, "{}", scenario.name);
    }
}

#[test]
fn one_live_challenge_per_topic() {
    let h = harness(voters(), ChallengeConfig::default());
    let first = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();

    let err = h.engine.open_challenge("a-1", " accuracy ", "u-2", "again").unwrap_err();
    match err {
        CredenceError::ChallengeError(ChallengeError::AlreadyOpen { existing_id, .. }) => {
            assert_eq!(existing_id, first.id)
        }
        other => panic!("expected AlreadyOpen, got {other}"),
    }

    // A different topic is independent.
    h.engine.open_challenge("a-1", "sourcing", "u-2", "r").unwrap();

    // Once resolved, the topic can be reopened.
    h.engine.resolve(&first.id, "moderator").unwrap();
    h.engine.open_challenge("a-1", "accuracy", "u-3", "new data").unwrap();
    assert_eq!(h.engine.challenges_for("a-1").unwrap().len(), 3);
}

#[test]
fn open_challenge_rejects_bad_input() {
    let h = harness(voters(), ChallengeConfig::default());
    assert_eq!(
        h.engine.open_challenge("a-1", "  ", "u-1", "r").unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        h.engine.open_challenge("missing", "accuracy", "u-1", "r").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn vote_errors_surface_with_their_kind() {
    let h = harness(voters(), ChallengeConfig::default());
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();

    let bad_confidence = h.engine.cast_vote(&c.id, "v-16", VoteChoice::Sustain, 0.0).unwrap_err();
    assert!(matches!(
        bad_confidence,
        CredenceError::ChallengeError(ChallengeError::InvalidConfidence { .. })
    ));
    assert_eq!(
        h.engine.cast_vote("c-missing", "v-16", VoteChoice::Sustain, 1.0).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        h.engine.cast_vote(&c.id, "stranger", VoteChoice::Sustain, 1.0).unwrap_err().kind(),
        ErrorKind::Validation
    );

    h.engine.resolve(&c.id, "moderator").unwrap();
    let late = h.engine.cast_vote(&c.id, "v-16", VoteChoice::Dismiss, 1.0).unwrap_err();
    assert!(matches!(
        late,
        CredenceError::ChallengeError(ChallengeError::AlreadyResolved { .. })
    ));
    let again = h.engine.resolve(&c.id, "moderator").unwrap_err();
    assert_eq!(again.kind(), ErrorKind::Conflict);
}

#[test]
fn votes_after_deadline_are_closed_and_sweep_resolves() {
    let h = harness(voters(), ChallengeConfig::default());
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();
    h.engine.cast_vote(&c.id, "v-16", VoteChoice::Dismiss, 1.0).unwrap();

    h.clock.advance(Duration::days(8));
    let late = h.engine.cast_vote(&c.id, "v-100", VoteChoice::Sustain, 1.0).unwrap_err();
    assert!(matches!(late, CredenceError::ChallengeError(ChallengeError::VotingClosed { .. })));

    let resolved = h.engine.sweep().unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].state, ChallengeState::ResolvedDismissed);
    assert_eq!(resolved[0].trigger, ResolutionTrigger::Deadline);

    assert!(h.engine.sweep().unwrap().is_empty());
}

#[test]
fn deadline_without_weight_expires() {
    let h = harness(voters(), ChallengeConfig::default());
    let quiet = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();
    let zero = h.engine.open_challenge("a-1", "sourcing", "u-1", "r").unwrap();
    h.engine.cast_vote(&zero.id, "v-zero", VoteChoice::Sustain, 1.0).unwrap();

    h.clock.advance(Duration::days(8));
    let resolved = h.engine.sweep().unwrap();
    assert_eq!(resolved.len(), 2);
    for outcome in resolved {
        assert_eq!(outcome.state, ChallengeState::ClosedExpired, "{}", outcome.challenge_id);
    }
    assert!(h.engine.get(&quiet.id).unwrap().is_terminal());
}

#[test]
fn ambiguous_ratio_resolves_partial() {
    let h = harness(voters(), ChallengeConfig::default());
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();
    // 4.0 sustain vs 5.0 dismiss: ratio 0.444.
    h.engine.cast_vote(&c.id, "v-16", VoteChoice::Sustain, 1.0).unwrap();
    h.engine.cast_vote(&c.id, "v-25", VoteChoice::Dismiss, 1.0).unwrap();

    let outcome = h.engine.resolve(&c.id, "moderator").unwrap();
    assert_eq!(outcome.state, ChallengeState::ResolvedPartial);
    assert_eq!(outcome.trigger, ResolutionTrigger::Manual { actor: "moderator".into() });
}

#[test]
fn frozen_assertion_refuses_new_challenges_and_votes() {
    let h = harness(voters(), ChallengeConfig::default());
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();

    let mut frozen = text_assertion("a-2", "verified claim");
    frozen.immutable = true;
    frozen.weight = Weight::new(0.95);
    h.store.insert_assertion(&frozen).unwrap();
    assert_eq!(
        h.engine.open_challenge("a-2", "accuracy", "u-1", "r").unwrap_err().kind(),
        ErrorKind::ImmutabilityViolation
    );

    // Freezing a-1 after the challenge opened blocks further votes.
    let mut a1 = h.store.get_assertion("a-1").unwrap().unwrap();
    a1.immutable = true;
    a1.weight = Weight::new(0.95);
    let frozen_store = MemoryStore::new();
    frozen_store.insert_assertion(&a1).unwrap();
    let engine = ChallengeEngine::new(
        h.store.clone(),
        Arc::new(frozen_store),
        Arc::new(voters()),
        h.clock.clone(),
        Arc::new(ReviewGate::new()),
        &ChallengeConfig::default(),
    );
    assert_eq!(
        engine.cast_vote(&c.id, "v-16", VoteChoice::Sustain, 1.0).unwrap_err().kind(),
        ErrorKind::ImmutabilityViolation
    );
}

#[test]
fn concurrent_votes_are_all_counted() {
    let mut reputation = StaticReputation::new();
    for i in 0..16 {
        reputation = reputation.with(&format!("voter-{i}"), 4.0);
    }
    let h = Arc::new(harness(reputation, ChallengeConfig::default()));
    let c = h.engine.open_challenge("a-1", "accuracy", "u-1", "r").unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let h = Arc::clone(&h);
            let id = c.id.clone();
            thread::spawn(move || {
                let choice = if i % 2 == 0 { VoteChoice::Sustain } else { VoteChoice::Dismiss };
                h.engine.cast_vote(&id, &format!("voter-{i}"), choice, 1.0).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let t = h.engine.tally(&c.id).unwrap();
    assert_eq!(t.vote_count, 16);
    assert!((t.total_weight() - 32.0).abs() < 1e-9);
    assert_eq!(h.engine.get(&c.id).unwrap().version, 16);
    assert_eq!(h.engine.pending_locks(), 0);
    assert!(h.gate.is_empty());
}

#[test]
fn lock_tables_empty_once_challenges_settle() {
    let h = harness(voters(), ChallengeConfig::default());
    for i in 0..50 {
        let c = h.engine.open_challenge("a-1", &format!("topic-{i}"), "u-1", "r").unwrap();
        h.engine.cast_vote(&c.id, "v-100", VoteChoice::Sustain, 1.0).unwrap();
        h.engine.resolve(&c.id, "moderator").unwrap();
    }
    h.engine.open_challenge("a-1", "expiring", "u-1", "r").unwrap();
    h.clock.advance(Duration::days(30));
    assert_eq!(h.engine.sweep().unwrap().len(), 1);

    assert_eq!(h.engine.pending_locks(), 0);
    assert!(h.gate.is_empty());
    assert_eq!(h.store.open_challenges().unwrap().len(), 0);
}
