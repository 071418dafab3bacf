use credence_core::models::{Challenge, ChallengeOutcome, ChallengeState};

use crate::context::ScoringContext;

/// Share of the full impact a challenge earns from its participation:
/// `1 - e^(-total_weight / scale)`. Zero when nobody voted.
pub fn participation(total_weight: f64, scale: f64) -> f64 {
    if total_weight <= 0.0 || scale <= 0.0 {
        return 0.0;
    }
    1.0 - (-total_weight / scale).exp()
}

/// Weight adjustment contributed by one resolved challenge.
///
/// Sustained challenges pull down in proportion to the sustain share,
/// dismissed ones push up in proportion to the dismiss share, partial
/// outcomes lean whichever way the ratio leans from 0.5. An expired
/// challenge with no votes counts as a weak dismissal.
pub fn adjustment(outcome: &ChallengeOutcome, ctx: &ScoringContext) -> f64 {
    let impact = ctx.challenge_impact;
    let ratio = outcome.consensus_ratio.clamp(0.0, 1.0);
    let p = participation(outcome.total_weight, ctx.participation_scale);
    match outcome.state {
        ChallengeState::ResolvedSustained => -impact * ratio * p,
        ChallengeState::ResolvedDismissed => impact * (1.0 - ratio) * p,
        ChallengeState::ResolvedPartial => impact * (0.5 - ratio) * p,
        ChallengeState::ClosedExpired => impact * ctx.expired_dismissal_factor,
        ChallengeState::Open | ChallengeState::Voting => 0.0,
    }
}

/// Summed adjustment over the resolved challenges in `history`, in id order.
/// Open challenges contribute nothing.
pub fn total_adjustment(history: &[&Challenge], ctx: &ScoringContext) -> f64 {
    history
        .iter()
        .filter(|c| c.is_terminal())
        .filter_map(|c| c.outcome.as_ref())
        .map(|o| adjustment(o, ctx))
        .sum()
}
