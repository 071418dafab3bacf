use chrono::{DateTime, Utc};
use credence_core::models::Evidence;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Evidence age in fractional days. Evidence dated after `as_of` has age 0.
pub fn age_days(evidence: &Evidence, as_of: DateTime<Utc>) -> f64 {
    (as_of - evidence.submitted_at()).num_seconds().max(0) as f64 / SECONDS_PER_DAY
}

/// Temporal decay factor: `e^(-rate × age_days)`.
///
/// Range: (0.0, 1.0]. A rate of 0 disables decay.
pub fn calculate(evidence: &Evidence, as_of: DateTime<Utc>, default_rate: f64) -> f64 {
    let rate = evidence.decay_rate().unwrap_or(default_rate);
    if rate <= 0.0 {
        return 1.0;
    }
    (-rate * age_days(evidence, as_of)).exp()
}

/// Signed, decayed contribution of one piece of evidence.
pub fn contribution(evidence: &Evidence, as_of: DateTime<Utc>, default_rate: f64) -> f64 {
    evidence.sign() * evidence.source_credibility() * calculate(evidence, as_of, default_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn zero_rate_never_decays() {
        let now = Utc::now();
        let e = Evidence::supporting("e", "a", 0.8, now - Duration::days(3650));
        assert_eq!(calculate(&e, now, 0.0), 1.0);
    }

    #[test]
    fn one_day_at_unit_rate_is_one_over_e() {
        let now = Utc::now();
        let e = Evidence::supporting("e", "a", 0.8, now - Duration::days(1)).with_decay_rate(1.0);
        assert!((calculate(&e, now, 0.0) - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn future_evidence_counts_as_fresh() {
        let now = Utc::now();
        let e = Evidence::refuting("e", "a", 0.5, now + Duration::days(2)).with_decay_rate(0.5);
        assert_eq!(age_days(&e, now), 0.0);
        assert_eq!(contribution(&e, now, 0.0), -0.5);
    }
}
