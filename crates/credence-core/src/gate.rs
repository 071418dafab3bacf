//! Per-assertion review gate.
//!
//! Challenge resolution and promotion review of the same assertion run
//! under the same gate, so a promotion never observes a half-applied
//! resolution. Different assertions never contend. An entry lives only
//! while some caller holds or waits on it.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

/// Serializes review work per assertion id.
#[derive(Debug, Default)]
pub struct ReviewGate {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ReviewGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the gate for `assertion_id`.
    /// Blocks while another review of the same assertion is in progress.
    pub fn with_review<T>(&self, assertion_id: &str, f: impl FnOnce() -> T) -> T {
        let lock = self
            .locks
            .entry(assertion_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let out = {
            // The gate guards no data, so a poisoned lock is still a valid lock.
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f()
        };
        drop(lock);
        // Waiters hold a clone, so a count of 1 means only the map is left.
        self.locks.remove_if(assertion_id, |_, lock| Arc::strong_count(lock) == 1);
        out
    }

    /// Whether a review of `assertion_id` is currently running.
    pub fn is_busy(&self, assertion_id: &str) -> bool {
        self.locks
            .get(assertion_id)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Assertions with a review running or waiting.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn same_assertion_reviews_do_not_overlap() {
        let gate = Arc::new(ReviewGate::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let active = Arc::clone(&active);
                let max_seen = Arc::clone(&max_seen);
                std::thread::spawn(move || {
                    gate.with_review("a-1", || {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(2));
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert!(gate.is_empty());
    }

    #[test]
    fn finished_reviews_leave_no_entries() {
        let gate = ReviewGate::new();
        for i in 0..1_000 {
            gate.with_review(&format!("a-{i}"), || ());
        }
        assert!(gate.is_empty());

        let inner = gate.with_review("outer", || gate.len());
        assert_eq!(inner, 1);
        assert_eq!(gate.len(), 0);
    }

    #[test]
    fn idle_gate_is_not_busy() {
        let gate = ReviewGate::new();
        assert!(!gate.is_busy("nobody"));
        gate.with_review("a-2", || ());
        assert!(!gate.is_busy("a-2"));
    }
}
