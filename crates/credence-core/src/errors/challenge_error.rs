use super::ErrorKind;

/// Challenge lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum ChallengeError {
    #[error("challenge {challenge_id} already resolved as {state}")]
    AlreadyResolved { challenge_id: String, state: String },

    #[error("assertion {assertion_id} already has open challenge {existing_id} on topic '{topic}'")]
    AlreadyOpen {
        assertion_id: String,
        topic: String,
        existing_id: String,
    },

    #[error("invalid vote confidence {confidence}: must be in (0, 1]")]
    InvalidConfidence { confidence: f64 },

    #[error("invalid reputation {reputation} for voter {voter_id}")]
    InvalidReputation { voter_id: String, reputation: f64 },

    #[error("voting on challenge {challenge_id} closed at {deadline}")]
    VotingClosed { challenge_id: String, deadline: String },
}

impl ChallengeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChallengeError::AlreadyResolved { .. }
            | ChallengeError::AlreadyOpen { .. }
            | ChallengeError::VotingClosed { .. } => ErrorKind::Conflict,
            ChallengeError::InvalidConfidence { .. }
            | ChallengeError::InvalidReputation { .. } => ErrorKind::Validation,
        }
    }
}
