use credence_core::config::*;

#[test]
fn empty_toml_yields_all_defaults() {
    let config = CredenceConfig::from_toml("").unwrap();

    // Scoring
    assert_eq!(config.scoring.logistic_steepness, 1.0);
    assert_eq!(config.scoring.default_decay_rate, 0.0);
    assert_eq!(config.scoring.challenge_impact, 0.3);
    assert_eq!(config.scoring.participation_scale, 10.0);
    assert_eq!(config.scoring.cache_capacity, 100_000);

    // Challenge
    assert_eq!(config.challenge.supermajority, SupermajorityPolicy::TwoThirds);
    assert_eq!(config.challenge.min_review_period_secs, 86_400);
    assert_eq!(config.challenge.voting_period_secs, 604_800);
    assert_eq!(config.challenge.ambiguous_band_low, 0.4);
    assert_eq!(config.challenge.ambiguous_band_high, 0.6);
    assert_eq!(config.challenge.min_votes, 1);

    // Dedup
    assert_eq!(config.dedup.near_duplicate_threshold, 0.8);
    assert_eq!(config.dedup.semantic_threshold, 0.85);
    assert_eq!(config.dedup.minhash_permutations, 128);
    assert_eq!(config.dedup.minhash_bands, 32);
    assert!(config.dedup.semantic_enabled);

    // Promotion
    assert_eq!(config.promotion.methodology_threshold, 0.8);
    assert_eq!(config.promotion.consensus_threshold, 0.8);
    assert_eq!(config.promotion.evidence_quality_threshold, 0.8);

    // Observability
    assert_eq!(config.observability.log_level, "info");
    assert!(config.observability.json_logs);
}

#[test]
fn partial_toml_overrides_only_named_keys() {
    let toml = r#"
[scoring]
challenge_impact = 0.5

[challenge.supermajority]
policy = "custom"
threshold = 0.75

[dedup]
semantic_enabled = false
"#;
    let config = CredenceConfig::from_toml(toml).unwrap();
    assert_eq!(config.scoring.challenge_impact, 0.5);
    assert_eq!(config.scoring.participation_scale, 10.0);
    assert_eq!(config.challenge.supermajority, SupermajorityPolicy::Custom { threshold: 0.75 });
    assert!((config.challenge.supermajority.threshold() - 0.75).abs() < f64::EPSILON);
    assert!(!config.dedup.semantic_enabled);
    assert_eq!(config.dedup.shingle_size, 3);
}

#[test]
fn strict_policy_means_ninety_nine_percent() {
    assert!((SupermajorityPolicy::Strict.threshold() - 0.99).abs() < f64::EPSILON);
    assert!((SupermajorityPolicy::TwoThirds.threshold() - 2.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn out_of_range_values_are_rejected() {
    for bad in [
        "[scoring]\nchallenge_impact = 1.5",
        "[scoring]\nlogistic_steepness = 0.0",
        "[challenge.supermajority]\npolicy = \"custom\"\nthreshold = 0.5",
        "[challenge]\nambiguous_band_low = 0.55",
        "[challenge]\nvoting_period_secs = 0",
        "[dedup]\nminhash_bands = 7",
        "[dedup]\nshingle_size = 0",
        "[promotion]\nconsensus_threshold = -0.1",
    ] {
        let err = CredenceConfig::from_toml(bad).unwrap_err();
        assert!(
            matches!(err, credence_core::CredenceError::ConfigError(_)),
            "expected a config error for {bad:?}, got {err:?}"
        );
    }
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = CredenceConfig::from_toml("[scoring\nchallenge_impact = ").unwrap_err();
    assert_eq!(err.kind(), credence_core::ErrorKind::Internal);
}

#[test]
fn round_trips_through_toml_and_file() {
    let mut config = CredenceConfig::default();
    config.challenge.supermajority = SupermajorityPolicy::Strict;
    config.challenge.min_votes = 3;
    let text = config.to_toml().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credence.toml");
    std::fs::write(&path, text).unwrap();

    let loaded = CredenceConfig::from_file(&path).unwrap();
    assert_eq!(loaded.challenge.supermajority, SupermajorityPolicy::Strict);
    assert_eq!(loaded.challenge.min_votes, 3);
}

#[test]
fn missing_file_is_a_config_error() {
    let err = CredenceConfig::from_file(std::path::Path::new("/nonexistent/credence.toml")).unwrap_err();
    assert!(err.to_string().contains("credence.toml"));
}
