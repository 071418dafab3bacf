//! Configuration, loaded from TOML. Every section defaults independently,
//! so an empty document is a valid config.
//!
//! # Examples
//!
//! ```
//! use credence_core::config::{CredenceConfig, SupermajorityPolicy};
//!
//! let config = CredenceConfig::from_toml(r#"
//! [challenge.supermajority]
//! policy = "strict"
//! "#).unwrap();
//! assert_eq!(config.challenge.supermajority, SupermajorityPolicy::Strict);
//! assert!((config.challenge.supermajority.threshold() - 0.99).abs() < f64::EPSILON);
//! ```

pub mod defaults;

mod challenge_config;
mod dedup_config;
mod observability_config;
mod promotion_config;
mod scoring_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use challenge_config::{ChallengeConfig, SupermajorityPolicy};
pub use dedup_config::DedupConfig;
pub use observability_config::ObservabilityConfig;
pub use promotion_config::PromotionConfig;
pub use scoring_config::ScoringConfig;

use crate::errors::{CredenceError, CredenceResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredenceConfig {
    pub scoring: ScoringConfig,
    pub challenge: ChallengeConfig,
    pub dedup: DedupConfig,
    pub promotion: PromotionConfig,
    pub observability: ObservabilityConfig,
}

impl CredenceConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> CredenceResult<Self> {
        let config: CredenceConfig =
            toml::from_str(s).map_err(|e| CredenceError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: &Path) -> CredenceResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CredenceError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml(&raw)
    }

    pub fn to_toml(&self) -> CredenceResult<String> {
        toml::to_string(self).map_err(|e| CredenceError::ConfigError(e.to_string()))
    }

    /// Reject policy values the engines cannot work with.
    pub fn validate(&self) -> CredenceResult<()> {
        let unit = |name: &str, v: f64| -> CredenceResult<()> {
            if v.is_finite() && (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(CredenceError::ConfigError(format!("{name} = {v} must be in [0, 1]")))
            }
        };

        let s = &self.scoring;
        if !(s.logistic_steepness.is_finite() && s.logistic_steepness > 0.0) {
            return Err(CredenceError::ConfigError("scoring.logistic_steepness must be > 0".into()));
        }
        if !(s.default_decay_rate.is_finite() && s.default_decay_rate >= 0.0) {
            return Err(CredenceError::ConfigError("scoring.default_decay_rate must be >= 0".into()));
        }
        if !(s.participation_scale.is_finite() && s.participation_scale > 0.0) {
            return Err(CredenceError::ConfigError("scoring.participation_scale must be > 0".into()));
        }
        unit("scoring.challenge_impact", s.challenge_impact)?;
        unit("scoring.expired_dismissal_factor", s.expired_dismissal_factor)?;
        unit("scoring.ceiling_margin", s.ceiling_margin)?;

        let c = &self.challenge;
        let threshold = c.supermajority.threshold();
        if !(threshold.is_finite() && threshold > 0.5 && threshold <= 1.0) {
            return Err(CredenceError::ConfigError(format!(
                "challenge.supermajority threshold {threshold} must be in (0.5, 1]"
            )));
        }
        unit("challenge.ambiguous_band_low", c.ambiguous_band_low)?;
        unit("challenge.ambiguous_band_high", c.ambiguous_band_high)?;
        if !(c.ambiguous_band_low <= 0.5 && 0.5 <= c.ambiguous_band_high) {
            return Err(CredenceError::ConfigError(
                "challenge ambiguous band must contain 0.5".into(),
            ));
        }
        if c.voting_period_secs == 0 || c.sweep_interval_secs == 0 {
            return Err(CredenceError::ConfigError(
                "challenge voting period and sweep interval must be non-zero".into(),
            ));
        }

        let d = &self.dedup;
        unit("dedup.near_duplicate_threshold", d.near_duplicate_threshold)?;
        unit("dedup.perceptual_threshold", d.perceptual_threshold)?;
        unit("dedup.semantic_threshold", d.semantic_threshold)?;
        if d.shingle_size == 0 {
            return Err(CredenceError::ConfigError("dedup.shingle_size must be > 0".into()));
        }
        if d.minhash_bands == 0 || d.minhash_permutations % d.minhash_bands != 0 {
            return Err(CredenceError::ConfigError(
                "dedup.minhash_permutations must be a non-zero multiple of dedup.minhash_bands".into(),
            ));
        }
        if d.semantic_timeout_ms == 0 {
            return Err(CredenceError::ConfigError("dedup.semantic_timeout_ms must be > 0".into()));
        }

        let p = &self.promotion;
        unit("promotion.methodology_threshold", p.methodology_threshold)?;
        unit("promotion.consensus_threshold", p.consensus_threshold)?;
        unit("promotion.evidence_quality_threshold", p.evidence_quality_threshold)?;
        Ok(())
    }
}
