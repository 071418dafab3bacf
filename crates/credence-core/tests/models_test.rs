use chrono::{TimeZone, Utc};
use credence_core::models::*;
use credence_core::weight::Weight;
use ts_rs::TS;

fn at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap()
}

#[test]
fn events_serialize_with_an_event_tag() {
    let event = CredenceEvent::EvidenceScored(EvidenceScored {
        assertion_id: "a-1".into(),
        weight: Weight::new(0.7),
        version: 3,
        evidence_count: 2,
        trigger: ScoreTrigger::Evidence {
            evidence_id: "e-2".into(),
        },
        scored_at: at(),
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "evidence_scored");
    assert_eq!(json["trigger"]["cause"], "evidence");
    assert_eq!(event.name(), "evidence_scored");

    let back: CredenceEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, event);
}

#[test]
fn payload_kinds_and_text_views() {
    assert_eq!(Payload::Text("x".into()).kind(), "text");
    assert!(Payload::Text("   ".into()).is_empty());
    let binary = Payload::Binary {
        media_type: "image/png".into(),
        bytes: vec![1, 2, 3],
    };
    assert_eq!(binary.as_text(), None);
    let structured = Payload::Structured(serde_json::json!({"b": 1, "a": 2}));
    assert_eq!(structured.as_text().unwrap(), r#"{"a":2,"b":1}"#);
}

#[test]
fn frozen_assertion_rejects_writes() {
    let mut a = Assertion::new("a-1", Payload::Text("claim".into()), MethodologyChecklist::default(), at());
    assert!(a.ensure_writable("submit_evidence").is_ok());
    assert_eq!(a.weight, Weight::PROVISIONAL);

    a.immutable = true;
    a.weight = Weight::new(0.93);
    assert!(a.is_verified());
    let err = a.ensure_writable("cast_vote").unwrap_err();
    assert!(err.to_string().contains("cast_vote"));
}

#[test]
fn evidence_validation_checks_ranges() {
    assert!(Evidence::supporting("e", "a", 0.5, at()).validate().is_ok());
    assert!(Evidence::supporting("e", "a", 1.2, at()).validate().is_err());
    assert!(Evidence::refuting("e", "a", f64::NAN, at()).validate().is_err());
    assert!(Evidence::neutral("e", "a", 0.5, at(), "ctx")
        .with_decay_rate(-1.0)
        .validate()
        .is_err());
    assert!(Evidence::supporting("  ", "a", 0.5, at()).validate().is_err());
}

#[test]
fn weight_clamps_and_tolerates_nan() {
    assert_eq!(Weight::new(1.7).value(), 1.0);
    assert_eq!(Weight::new(-0.2).value(), 0.0);
    assert_eq!(Weight::new(f64::NAN), Weight::PROVISIONAL);
    assert!(Weight::new(0.9).is_high());
    assert!(!Weight::new(0.899).is_high());
}

fn assert_ts<T: TS>() {}

#[test]
fn export_bindings() {
    // ts-rs writes the .ts files for every #[ts(export)] type during `cargo test`.
    // Naming the public surface here makes a derive that stops compiling fail this test.
    assert_ts::<Assertion>();
    assert_ts::<Evidence>();
    assert_ts::<Challenge>();
    assert_ts::<ChallengeOutcome>();
    assert_ts::<Vote>();
    assert_ts::<PromotionEvent>();
    assert_ts::<EligibilityReport>();
    assert_ts::<DuplicateCheck>();
    assert_ts::<FingerprintRecord>();
    assert_ts::<DegradationEvent>();
    assert_ts::<CredenceEvent>();
    assert_ts::<Weight>();
}

mod properties {
    use credence_core::weight::{is_immutable, Weight};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn weight_is_always_in_unit_range(v in proptest::num::f64::ANY) {
            let w = Weight::new(v).value();
            prop_assert!((0.0..=1.0).contains(&w));
        }

        #[test]
        fn only_promoted_high_weights_are_immutable(v in 0.0f64..=1.0, promoted in any::<bool>()) {
            let w = Weight::new(v);
            prop_assert_eq!(is_immutable(w, promoted), promoted && w.is_high());
        }
    }
}
