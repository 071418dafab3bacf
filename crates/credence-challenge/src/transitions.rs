//! Challenge state transitions.
//!
//! Valid transitions:
//! - Open → Voting (first vote)
//! - Voting → Voting (further votes, re-votes)
//! - Open | Voting → any terminal state (resolution)
//!
//! Nothing leaves a terminal state; attempts return `AlreadyResolved`.

use chrono::{DateTime, Utc};
use credence_core::errors::{ChallengeError, CredenceError, CredenceResult};
use credence_core::models::{Challenge, ChallengeOutcome, ChallengeState, ResolutionTrigger, Vote};

use crate::tally::Tally;

/// `AlreadyResolved` if the challenge is terminal.
pub fn ensure_live(challenge: &Challenge) -> CredenceResult<()> {
    if challenge.is_terminal() {
        return Err(ChallengeError::AlreadyResolved {
            challenge_id: challenge.id.clone(),
            state: challenge.state.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Record `vote`, replacing any earlier vote by the same voter.
/// Returns whether an earlier vote was replaced.
pub fn record_vote(challenge: &mut Challenge, vote: Vote) -> CredenceResult<bool> {
    ensure_live(challenge)?;
    if vote.challenge_id != challenge.id {
        return Err(CredenceError::ValidationError(format!(
            "vote {} is for challenge {}, not {}",
            vote.id, vote.challenge_id, challenge.id
        )));
    }
    let replaced = challenge.votes.insert(vote.voter_id.clone(), vote).is_some();
    challenge.state = ChallengeState::Voting;
    Ok(replaced)
}

/// Move a live challenge into terminal `state` and attach its outcome.
pub fn resolve(
    challenge: &mut Challenge,
    state: ChallengeState,
    tally: &Tally,
    trigger: ResolutionTrigger,
    at: DateTime<Utc>,
) -> CredenceResult<ChallengeOutcome> {
    ensure_live(challenge)?;
    if !state.is_terminal() {
        return Err(CredenceError::ValidationError(format!(
            "cannot resolve challenge {} into non-terminal state {state}",
            challenge.id
        )));
    }
    let outcome = ChallengeOutcome {
        challenge_id: challenge.id.clone(),
        assertion_id: challenge.assertion_id.clone(),
        state,
        consensus_ratio: tally.consensus_ratio(),
        sustain_weight: tally.sustain_weight,
        dismiss_weight: tally.dismiss_weight,
        total_weight: tally.total_weight(),
        vote_count: tally.vote_count,
        trigger,
        resolved_at: at,
    };
    challenge.state = state;
    challenge.outcome = Some(outcome.clone());
    Ok(outcome)
}
