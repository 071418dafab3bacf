use credence_core::models::Evidence;

/// Mean source credibility over all evidence, 0 when there is none.
pub fn evidence_quality(evidence: &[Evidence]) -> f64 {
    if evidence.is_empty() {
        return 0.0;
    }
    let sum: f64 = evidence.iter().map(|e| e.source_credibility()).sum();
    (sum / evidence.len() as f64).clamp(0.0, 1.0)
}
