use chrono::{DateTime, Utc};
use credence_core::config::ScoringConfig;

/// Inputs to scoring that are not part of the assertion itself.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// Instant evidence age is measured against.
    pub as_of: DateTime<Utc>,
    pub logistic_steepness: f64,
    pub default_decay_rate: f64,
    pub challenge_impact: f64,
    pub participation_scale: f64,
    pub expired_dismissal_factor: f64,
    pub ceiling_margin: f64,
}

impl ScoringContext {
    pub fn new(as_of: DateTime<Utc>, config: &ScoringConfig) -> Self {
        Self {
            as_of,
            logistic_steepness: config.logistic_steepness,
            default_decay_rate: config.default_decay_rate,
            challenge_impact: config.challenge_impact,
            participation_scale: config.participation_scale,
            expired_dismissal_factor: config.expired_dismissal_factor,
            ceiling_margin: config.ceiling_margin,
        }
    }

    /// Default policy evaluated at `as_of`.
    pub fn at(as_of: DateTime<Utc>) -> Self {
        Self::new(as_of, &ScoringConfig::default())
    }
}
