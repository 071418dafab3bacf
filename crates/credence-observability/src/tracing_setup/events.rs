//! Structured log events for key system operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a rescoring event.
pub fn evidence_scored(assertion_id: &str, weight: f64, version: u64, evidence_count: usize) {
    tracing::info!(
        event = "evidence_scored",
        assertion_id = %assertion_id,
        weight = weight,
        version = version,
        evidence_count = evidence_count,
        "assertion rescored"
    );
}

/// Log a challenge being opened.
pub fn challenge_opened(challenge_id: &str, assertion_id: &str, topic: &str) {
    tracing::info!(
        event = "challenge_opened",
        challenge_id = %challenge_id,
        assertion_id = %assertion_id,
        topic = %topic,
        "challenge opened"
    );
}

/// Log a vote. `replaced` is true when it superseded the voter's earlier vote.
pub fn vote_cast(challenge_id: &str, voter_id: &str, choice: &str, weight: f64, replaced: bool) {
    tracing::debug!(
        event = "vote_cast",
        challenge_id = %challenge_id,
        voter_id = %voter_id,
        choice = %choice,
        weight = weight,
        replaced = replaced,
        "vote cast"
    );
}

/// Log a challenge reaching a terminal state.
pub fn challenge_resolved(challenge_id: &str, state: &str, consensus_ratio: f64, trigger: &str) {
    tracing::info!(
        event = "challenge_resolved",
        challenge_id = %challenge_id,
        state = %state,
        consensus_ratio = consensus_ratio,
        trigger = %trigger,
        "challenge resolved"
    );
}

/// Log a promotion.
pub fn assertion_promoted(assertion_id: &str, previous_weight: f64, final_weight: f64) {
    tracing::info!(
        event = "assertion_promoted",
        assertion_id = %assertion_id,
        previous_weight = previous_weight,
        final_weight = final_weight,
        "assertion promoted"
    );
}

/// Log a manual override. Always at warn: overrides bypass the criteria.
pub fn manual_override(assertion_id: &str, actor: &str, overridden: &[&str], justification: &str) {
    tracing::warn!(
        event = "manual_override",
        assertion_id = %assertion_id,
        actor = %actor,
        overridden = ?overridden,
        justification = %justification,
        "promotion criteria overridden"
    );
}

/// Log a duplicate hit.
pub fn duplicate_detected(tier: &str, matched_id: &str, score: f64, recommendation: &str) {
    tracing::info!(
        event = "duplicate_detected",
        tier = %tier,
        matched_id = %matched_id,
        score = score,
        recommendation = %recommendation,
        "duplicate detected"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}
