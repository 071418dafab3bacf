//! Record every degradation: component, failure mode, fallback used,
//! timestamp, recovery status.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use credence_core::models::DegradationEvent;
use serde::{Deserialize, Serialize};

/// Recovered episodes kept for reporting. Active episodes are never dropped.
pub const MAX_EPISODES: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    /// Still in degraded mode.
    Active,
    Recovered,
}

/// One degradation episode of a component, from its first failure until
/// recovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    /// The failure that opened the episode.
    pub event: DegradationEvent,
    /// Failures recorded during the episode, the first included.
    pub occurrences: u64,
    pub last_seen: DateTime<Utc>,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

/// In-memory degradation history.
///
/// A failure of a component that is already degraded folds into its active
/// episode, so a long outage costs one entry however often it is hit.
#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    episodes: VecDeque<TrackedDegradation>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DegradationEvent) {
        if let Some(active) = self
            .episodes
            .iter_mut()
            .find(|t| t.event.component == event.component && t.recovery_status == RecoveryStatus::Active)
        {
            active.occurrences += 1;
            active.last_seen = active.last_seen.max(event.timestamp);
            tracing::debug!(
                component = %event.component,
                occurrences = active.occurrences,
                "degraded component failed again"
            );
            return;
        }

        crate::tracing_setup::events::degradation_triggered(
            &event.component,
            &event.failure,
            &event.fallback_used,
        );
        self.episodes.push_back(TrackedDegradation {
            last_seen: event.timestamp,
            event,
            occurrences: 1,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
        self.evict_recovered();
    }

    /// Close the active episode of `component`. Returns how many failures
    /// it had absorbed, 0 if the component was healthy.
    pub fn mark_recovered(&mut self, component: &str, at: DateTime<Utc>) -> u64 {
        let Some(active) = self
            .episodes
            .iter_mut()
            .find(|t| t.event.component == component && t.recovery_status == RecoveryStatus::Active)
        else {
            return 0;
        };
        active.recovery_status = RecoveryStatus::Recovered;
        active.recovered_at = Some(at);
        tracing::info!(component = %component, failures = active.occurrences, "component recovered");
        active.occurrences
    }

    /// Episodes, oldest first.
    pub fn events(&self) -> Vec<TrackedDegradation> {
        self.episodes.iter().cloned().collect()
    }

    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.episodes
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.episodes
            .iter()
            .any(|t| t.event.component == component && t.recovery_status == RecoveryStatus::Active)
    }

    /// Episodes of `component` that opened strictly after `since`.
    pub fn count_since(&self, component: &str, since: DateTime<Utc>) -> usize {
        self.episodes
            .iter()
            .filter(|t| t.event.component == component && t.event.timestamp > since)
            .count()
    }

    /// How long `component` has been continuously degraded as of `now`.
    pub fn degraded_duration(&self, component: &str, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.episodes
            .iter()
            .find(|t| t.event.component == component && t.recovery_status == RecoveryStatus::Active)
            .map(|t| now - t.event.timestamp)
    }

    fn evict_recovered(&mut self) {
        while self.episodes.len() > MAX_EPISODES {
            let Some(pos) = self
                .episodes
                .iter()
                .position(|t| t.recovery_status == RecoveryStatus::Recovered)
            else {
                break;
            };
            self.episodes.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(component: &str, at: DateTime<Utc>) -> DegradationEvent {
        DegradationEvent::new(component, "timeout", "skip tier", at)
    }

    #[test]
    fn recovery_clears_only_the_named_component() {
        let now = Utc::now();
        let mut tracker = DegradationTracker::new();
        tracker.record(event("dedup.semantic", now));
        tracker.record(event("dedup.semantic", now));
        tracker.record(event("other", now));

        assert_eq!(tracker.mark_recovered("dedup.semantic", now), 2);
        assert_eq!(tracker.mark_recovered("dedup.semantic", now), 0);
        assert!(!tracker.is_degraded("dedup.semantic"));
        assert!(tracker.is_degraded("other"));
        assert_eq!(tracker.active_degradations().len(), 1);
    }

    #[test]
    fn degraded_duration_measures_from_episode_start() {
        let start = Utc::now();
        let mut tracker = DegradationTracker::new();
        tracker.record(event("dedup.semantic", start));
        tracker.record(event("dedup.semantic", start + Duration::seconds(30)));

        let d = tracker
            .degraded_duration("dedup.semantic", start + Duration::seconds(60))
            .unwrap();
        assert_eq!(d, Duration::seconds(60));
        assert!(tracker.degraded_duration("nobody", start).is_none());
        assert_eq!(tracker.events()[0].last_seen, start + Duration::seconds(30));
    }

    #[test]
    fn sustained_outage_is_one_entry() {
        let start = Utc::now();
        let mut tracker = DegradationTracker::new();
        for i in 0..10_000 {
            tracker.record(event("dedup.semantic", start + Duration::milliseconds(i)));
        }
        let history = tracker.events();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].occurrences, 10_000);
    }

    #[test]
    fn flapping_keeps_a_bounded_history() {
        let start = Utc::now();
        let mut tracker = DegradationTracker::new();
        for i in 0..(MAX_EPISODES as i64 * 3) {
            let at = start + Duration::seconds(i);
            tracker.record(event("dedup.semantic", at));
            tracker.mark_recovered("dedup.semantic", at);
        }
        tracker.record(event("dedup.semantic", start + Duration::days(1)));

        let history = tracker.events();
        assert_eq!(history.len(), MAX_EPISODES);
        assert_eq!(history.last().unwrap().recovery_status, RecoveryStatus::Active);
        assert!(tracker.is_degraded("dedup.semantic"));
    }
}
