use chrono::Duration;
use credence_core::models::{
    Challenge, ChallengeOutcome, ChallengeState, Evidence, ResolutionTrigger,
};
use credence_core::weight::Weight;
use credence_core::CredenceError;
use credence_scoring::{compute_breakdown, compute_weight, CredibilityScorer, ScoringContext, ScoringInput};
use test_fixtures::{base_time, list_fixtures, load_fixture, text_assertion, ScoringScenario};

fn resolved(id: &str, state: ChallengeState, ratio: f64, total: f64) -> Challenge {
    let now = base_time();
    Challenge {
        id: id.into(),
        assertion_id: "a-1".into(),
        topic: "accuracy".into(),
        raised_by: "u-1".into(),
        reason: "disputed".into(),
        created_at: now,
        deadline: now + Duration::days(7),
        state,
        version: 3,
        votes: Default::default(),
        outcome: Some(ChallengeOutcome {
            challenge_id: id.into(),
            assertion_id: "a-1".into(),
            state,
            consensus_ratio: ratio,
            sustain_weight: ratio * total,
            dismiss_weight: (1.0 - ratio) * total,
            total_weight: total,
            vote_count: 3,
            trigger: ResolutionTrigger::Deadline,
            resolved_at: now + Duration::days(7),
        }),
    }
}

#[test]
fn golden_scoring_scenarios() {
    let files = list_fixtures("scenarios");
    let scoring: Vec<_> = files
        .iter()
        .filter(|p| p.file_name().is_some_and(|n| n.to_string_lossy().starts_with("scoring_")))
        .collect();
    assert!(scoring.len() >= 3, "expected scoring fixtures, found {}", scoring.len());

    let as_of = base_time();
    let assertion = text_assertion("a-1", "claim");
    for path in scoring {
        let rel = format!("scenarios/{}", path.file_name().unwrap().to_string_lossy());
        let scenario: ScoringScenario = load_fixture(&rel);
        let evidence: Vec<Evidence> = scenario
            .evidence
            .iter()
            .enumerate()
            .map(|(i, spec)| spec.build(i, "a-1", as_of))
            .collect();
        let w = compute_weight(&assertion, &evidence, &[], &ScoringContext::at(as_of))
            .unwrap()
            .value();
        if let Some(min) = scenario.expected_min_weight {
            assert!(w >= min, "{}: weight {w} below {min}", scenario.name);
        }
        if let Some(max) = scenario.expected_max_weight {
            assert!(w <= max, "{}: weight {w} above {max}", scenario.name);
        }
    }
}

#[test]
fn three_supporting_sources_exceed_three_quarters() {
    let now = base_time();
    let evidence = vec![
        Evidence::supporting("e-1", "a-1", 0.9, now),
        Evidence::supporting("e-2", "a-1", 0.8, now),
        Evidence::supporting("e-3", "a-1", 0.7, now),
    ];
    let w = compute_weight(&text_assertion("a-1", "claim"), &evidence, &[], &ScoringContext::at(now)).unwrap();
    assert!(w.value() > 0.75);
    assert!(!w.is_high());
}

#[test]
fn sustained_challenge_lowers_weight_and_dismissed_raises_it() {
    let now = base_time();
    let a = text_assertion("a-1", "claim");
    let evidence = vec![Evidence::supporting("e-1", "a-1", 0.6, now)];
    let ctx = ScoringContext::at(now);

    let base = compute_weight(&a, &evidence, &[], &ctx).unwrap().value();
    let sustained = compute_weight(&a, &evidence, &[resolved("c-1", ChallengeState::ResolvedSustained, 0.9, 30.0)], &ctx)
        .unwrap()
        .value();
    let dismissed = compute_weight(&a, &evidence, &[resolved("c-1", ChallengeState::ResolvedDismissed, 0.1, 30.0)], &ctx)
        .unwrap()
        .value();
    assert!(sustained < base);
    assert!(dismissed > base);
}

#[test]
fn open_challenges_do_not_move_the_weight() {
    let now = base_time();
    let a = text_assertion("a-1", "claim");
    let mut open = resolved("c-1", ChallengeState::Open, 0.0, 0.0);
    open.outcome = None;
    let w = compute_weight(&a, &[], &[open], &ScoringContext::at(now)).unwrap();
    assert_eq!(w, Weight::PROVISIONAL);
}

#[test]
fn evidence_order_does_not_matter() {
    let now = base_time();
    let a = text_assertion("a-1", "claim");
    let mut evidence = vec![
        Evidence::supporting("e-1", "a-1", 0.3, now),
        Evidence::refuting("e-2", "a-1", 0.7, now - Duration::days(3)).with_decay_rate(0.05),
        Evidence::supporting("e-3", "a-1", 0.11, now),
    ];
    let ctx = ScoringContext::at(now);
    let forward = compute_weight(&a, &evidence, &[], &ctx).unwrap();
    evidence.reverse();
    let backward = compute_weight(&a, &evidence, &[], &ctx).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn breakdown_exposes_uncapped_value_for_promotion() {
    let now = base_time();
    let evidence: Vec<_> = (0..6).map(|i| Evidence::supporting(format!("e-{i}"), "a-1", 0.95, now)).collect();
    let b = compute_breakdown(&text_assertion("a-1", "claim"), &evidence, &[], &ScoringContext::at(now)).unwrap();
    assert!(b.capped);
    assert!(b.uncapped > b.weight.value());
    assert_eq!(b.evidence_count, 6);
}

#[test]
fn batch_isolates_bad_inputs() {
    let now = base_time();
    let good = text_assertion("a-1", "claim");
    let bad = text_assertion("a-2", "other claim");
    let good_evidence = vec![Evidence::supporting("e-1", "a-1", 0.9, now)];
    let foreign = vec![Evidence::supporting("e-2", "a-1", 0.9, now)];

    let scorer = CredibilityScorer::default();
    let results = scorer
        .score_batch(
            &[
                ScoringInput { assertion: &good, evidence: &good_evidence, challenges: &[] },
                ScoringInput { assertion: &bad, evidence: &foreign, challenges: &[] },
            ],
            now,
        )
        .unwrap();
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(CredenceError::InvalidEvidence { .. })));
}
