use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::constants::{HIGH_CREDIBILITY_THRESHOLD, PROVISIONAL_WEIGHT};

/// Trust weight clamped to [0.0, 1.0].
/// NaN collapses to the provisional default rather than propagating.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Weight(f64);

impl Weight {
    /// Provisional weight of a freshly submitted assertion.
    pub const PROVISIONAL: Weight = Weight(PROVISIONAL_WEIGHT);

    /// Create a new Weight, clamping to [0.0, 1.0].
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::PROVISIONAL;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw f64 value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// At or above the high-credibility threshold.
    pub fn is_high(self) -> bool {
        self.0 >= HIGH_CREDIBILITY_THRESHOLD
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::PROVISIONAL
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(w: Weight) -> Self {
        w.0
    }
}

/// The one place "highly credible and frozen" is decided.
///
/// Every call site that needs the verified status asks this function
/// instead of comparing a weight against the threshold itself.
pub fn is_immutable(weight: Weight, promoted: bool) -> bool {
    promoted && weight.is_high()
}
