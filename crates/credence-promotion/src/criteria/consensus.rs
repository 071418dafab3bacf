use credence_core::models::{Challenge, Evidence, Stance};

/// Share of the community signal that backs the assertion: supporting
/// evidence mass plus dismiss-vote weight, over everything that took a side.
/// Evidence counts by source credibility; challenges count by the weighted
/// votes of their recorded outcome. 0 when nothing took a side.
pub fn community_consensus(evidence: &[Evidence], challenges: &[Challenge]) -> f64 {
    let (supporting, refuting) = evidence.iter().fold((0.0, 0.0), |(s, r), e| match e.stance() {
        Stance::Supporting => (s + e.source_credibility(), r),
        Stance::Refuting => (s, r + e.source_credibility()),
        Stance::Neutral => (s, r),
    });
    let (dismiss, sustain) = challenges
        .iter()
        .filter_map(|c| c.outcome.as_ref())
        .fold((0.0, 0.0), |(d, s), o| (d + o.dismiss_weight, s + o.sustain_weight));

    let total = supporting + refuting + dismiss + sustain;
    if total <= 0.0 {
        0.0
    } else {
        ((supporting + dismiss) / total).clamp(0.0, 1.0)
    }
}
