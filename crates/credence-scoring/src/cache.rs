//! Explicit weight cache keyed by assertion id.
//!
//! Entries are `(version, weight)` pairs. Nothing expires on a timer:
//! an entry changes only when an event says the weight changed.

use credence_core::models::CredenceEvent;
use credence_core::weight::Weight;
use moka::ops::compute::Op;
use moka::sync::Cache;

/// A cached weight and the assertion version it was computed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedWeight {
    pub version: u64,
    pub weight: Weight,
}

pub struct WeightCache {
    cache: Cache<String, CachedWeight>,
}

impl WeightCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_entries).build(),
        }
    }

    pub fn get(&self, assertion_id: &str) -> Option<CachedWeight> {
        self.cache.get(assertion_id)
    }

    /// Store `weight` unless the cache already holds the same or a newer version.
    /// Returns whether the entry was written.
    pub fn insert_if_newer(&self, assertion_id: &str, version: u64, weight: Weight) -> bool {
        let result = self
            .cache
            .entry(assertion_id.to_string())
            .and_compute_with(|existing| match existing {
                Some(entry) if entry.value().version >= version => Op::Nop,
                _ => Op::Put(CachedWeight { version, weight }),
            });
        matches!(
            result,
            moka::ops::compute::CompResult::Inserted(_) | moka::ops::compute::CompResult::ReplacedWith(_)
        )
    }

    pub fn invalidate(&self, assertion_id: &str) {
        self.cache.invalidate(assertion_id);
    }

    /// React to a domain event.
    pub fn apply_event(&self, event: &CredenceEvent) {
        match event {
            CredenceEvent::EvidenceScored(scored) => {
                self.insert_if_newer(&scored.assertion_id, scored.version, scored.weight);
            }
            CredenceEvent::ChallengeResolved(outcome) => self.invalidate(&outcome.assertion_id),
            CredenceEvent::AssertionPromoted(event) => self.invalidate(&event.assertion_id),
            CredenceEvent::ChallengeOpened(_) => {}
        }
    }

    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for WeightCache {
    fn default() -> Self {
        Self::new(credence_core::config::defaults::DEFAULT_WEIGHT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use credence_core::models::{ChallengeOutcome, ChallengeState, EvidenceScored, ResolutionTrigger, ScoreTrigger};

    fn scored(id: &str, version: u64, weight: f64) -> CredenceEvent {
        CredenceEvent::EvidenceScored(EvidenceScored {
            assertion_id: id.into(),
            weight: Weight::new(weight),
            version,
            evidence_count: 1,
            trigger: ScoreTrigger::Evidence { evidence_id: "e".into() },
            scored_at: Utc::now(),
        })
    }

    #[test]
    fn stale_scores_do_not_overwrite_newer_ones() {
        let cache = WeightCache::new(100);
        cache.apply_event(&scored("a", 3, 0.7));
        cache.apply_event(&scored("a", 2, 0.4));
        assert_eq!(cache.get("a").unwrap().weight, Weight::new(0.7));
        cache.apply_event(&scored("a", 4, 0.6));
        assert_eq!(cache.get("a").unwrap().version, 4);
    }

    #[test]
    fn resolution_invalidates() {
        let cache = WeightCache::new(100);
        cache.apply_event(&scored("a", 1, 0.7));
        cache.apply_event(&CredenceEvent::ChallengeResolved(ChallengeOutcome {
            challenge_id: "c".into(),
            assertion_id: "a".into(),
            state: ChallengeState::ResolvedDismissed,
            consensus_ratio: 0.0,
            sustain_weight: 0.0,
            dismiss_weight: 1.0,
            total_weight: 1.0,
            vote_count: 1,
            trigger: ResolutionTrigger::Deadline,
            resolved_at: Utc::now(),
        }));
        assert!(cache.get("a").is_none());
    }
}
