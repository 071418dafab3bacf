use credence_core::errors::{ChallengeError, CredenceResult};

/// `sqrt(reputation) × confidence`. Square-root dampening keeps a handful of
/// very high-reputation voters from dominating. Negative reputation counts as 0.
pub fn vote_weight(reputation: f64, confidence: f64) -> f64 {
    reputation.max(0.0).sqrt() * confidence
}

/// Confidence must lie in (0, 1].
pub fn validate_confidence(confidence: f64) -> CredenceResult<()> {
    if confidence.is_finite() && confidence > 0.0 && confidence <= 1.0 {
        Ok(())
    } else {
        Err(ChallengeError::InvalidConfidence { confidence }.into())
    }
}

pub fn validate_reputation(voter_id: &str, reputation: f64) -> CredenceResult<()> {
    if reputation.is_finite() {
        Ok(())
    } else {
        Err(ChallengeError::InvalidReputation {
            voter_id: voter_id.to_string(),
            reputation,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_root_dampening() {
        assert_eq!(vote_weight(100.0, 1.0), 10.0);
        assert_eq!(vote_weight(25.0, 0.5), 2.5);
        assert_eq!(vote_weight(-4.0, 1.0), 0.0);
    }

    #[test]
    fn confidence_bounds() {
        assert!(validate_confidence(1.0).is_ok());
        assert!(validate_confidence(0.01).is_ok());
        assert!(validate_confidence(0.0).is_err());
        assert!(validate_confidence(1.01).is_err());
        assert!(validate_confidence(f64::NAN).is_err());
    }
}
