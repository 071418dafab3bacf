//! Evidence attached to exactly one assertion.
//!
//! Modeled as a tagged union so each stance carries explicit typed fields.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use credence_core::models::{Evidence, Stance};
//!
//! let e = Evidence::supporting("e-1", "a-1", 0.9, Utc::now());
//! assert_eq!(e.stance(), Stance::Supporting);
//! assert_eq!(e.sign(), 1.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{CredenceError, CredenceResult};

/// Evidence in favor of the assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupportingEvidence {
    pub id: String,
    pub assertion_id: String,
    /// Credibility of the source, in [0, 1].
    pub source_credibility: f64,
    pub submitted_at: DateTime<Utc>,
    /// Per-day exponential decay rate. `None` uses the configured default.
    pub decay_rate: Option<f64>,
    /// Citation or excerpt; the content fingerprinted for evidence dedup.
    pub citation: String,
}

/// Evidence against the assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RefutingEvidence {
    pub id: String,
    pub assertion_id: String,
    pub source_credibility: f64,
    pub submitted_at: DateTime<Utc>,
    pub decay_rate: Option<f64>,
    pub citation: String,
}

/// Contextual evidence. Counts toward evidence quality, not toward the weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NeutralEvidence {
    pub id: String,
    pub assertion_id: String,
    pub source_credibility: f64,
    pub submitted_at: DateTime<Utc>,
    pub decay_rate: Option<f64>,
    pub citation: String,
    pub context: String,
}

/// Which way a piece of evidence points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Supporting,
    Refuting,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    Supporting(SupportingEvidence),
    Refuting(RefutingEvidence),
    Neutral(NeutralEvidence),
}

impl Evidence {
    pub fn supporting(
        id: impl Into<String>,
        assertion_id: impl Into<String>,
        source_credibility: f64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Evidence::Supporting(SupportingEvidence {
            id: id.into(),
            assertion_id: assertion_id.into(),
            source_credibility,
            submitted_at,
            decay_rate: None,
            citation: String::new(),
        })
    }

    pub fn refuting(
        id: impl Into<String>,
        assertion_id: impl Into<String>,
        source_credibility: f64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Evidence::Refuting(RefutingEvidence {
            id: id.into(),
            assertion_id: assertion_id.into(),
            source_credibility,
            submitted_at,
            decay_rate: None,
            citation: String::new(),
        })
    }

    pub fn neutral(
        id: impl Into<String>,
        assertion_id: impl Into<String>,
        source_credibility: f64,
        submitted_at: DateTime<Utc>,
        context: impl Into<String>,
    ) -> Self {
        Evidence::Neutral(NeutralEvidence {
            id: id.into(),
            assertion_id: assertion_id.into(),
            source_credibility,
            submitted_at,
            decay_rate: None,
            citation: String::new(),
            context: context.into(),
        })
    }

    /// Set an explicit decay rate.
    pub fn with_decay_rate(mut self, rate: f64) -> Self {
        match &mut self {
            Evidence::Supporting(e) => e.decay_rate = Some(rate),
            Evidence::Refuting(e) => e.decay_rate = Some(rate),
            Evidence::Neutral(e) => e.decay_rate = Some(rate),
        }
        self
    }

    /// Set the citation text.
    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        let citation = citation.into();
        match &mut self {
            Evidence::Supporting(e) => e.citation = citation,
            Evidence::Refuting(e) => e.citation = citation,
            Evidence::Neutral(e) => e.citation = citation,
        }
        self
    }

    pub fn id(&self) -> &str {
        match self {
            Evidence::Supporting(e) => &e.id,
            Evidence::Refuting(e) => &e.id,
            Evidence::Neutral(e) => &e.id,
        }
    }

    pub fn assertion_id(&self) -> &str {
        match self {
            Evidence::Supporting(e) => &e.assertion_id,
            Evidence::Refuting(e) => &e.assertion_id,
            Evidence::Neutral(e) => &e.assertion_id,
        }
    }

    pub fn source_credibility(&self) -> f64 {
        match self {
            Evidence::Supporting(e) => e.source_credibility,
            Evidence::Refuting(e) => e.source_credibility,
            Evidence::Neutral(e) => e.source_credibility,
        }
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        match self {
            Evidence::Supporting(e) => e.submitted_at,
            Evidence::Refuting(e) => e.submitted_at,
            Evidence::Neutral(e) => e.submitted_at,
        }
    }

    pub fn decay_rate(&self) -> Option<f64> {
        match self {
            Evidence::Supporting(e) => e.decay_rate,
            Evidence::Refuting(e) => e.decay_rate,
            Evidence::Neutral(e) => e.decay_rate,
        }
    }

    pub fn citation(&self) -> &str {
        match self {
            Evidence::Supporting(e) => &e.citation,
            Evidence::Refuting(e) => &e.citation,
            Evidence::Neutral(e) => &e.citation,
        }
    }

    pub fn stance(&self) -> Stance {
        match self {
            Evidence::Supporting(_) => Stance::Supporting,
            Evidence::Refuting(_) => Stance::Refuting,
            Evidence::Neutral(_) => Stance::Neutral,
        }
    }

    /// +1 supporting, -1 refuting, 0 neutral.
    pub fn sign(&self) -> f64 {
        match self.stance() {
            Stance::Supporting => 1.0,
            Stance::Refuting => -1.0,
            Stance::Neutral => 0.0,
        }
    }

    /// Check numeric fields are in range.
    pub fn validate(&self) -> CredenceResult<()> {
        if self.id().trim().is_empty() {
            return Err(CredenceError::ValidationError("evidence id is empty".into()));
        }
        let credibility = self.source_credibility();
        if !credibility.is_finite() || !(0.0..=1.0).contains(&credibility) {
            return Err(CredenceError::ValidationError(format!(
                "evidence {}: source credibility {credibility} outside [0, 1]",
                self.id()
            )));
        }
        if let Some(rate) = self.decay_rate() {
            if !rate.is_finite() || rate < 0.0 {
                return Err(CredenceError::ValidationError(format!(
                    "evidence {}: decay rate {rate} must be finite and non-negative",
                    self.id()
                )));
            }
        }
        Ok(())
    }
}
