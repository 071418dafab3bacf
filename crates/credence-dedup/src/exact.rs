//! Tier 1: exact content hash.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Result of an atomic claim on an exact key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExactClaim {
    /// The key was free; `id` was allocated and now owns it.
    Claimed { id: String },
    /// Someone already owns the key. No id was allocated.
    Existing { id: String },
}

impl ExactClaim {
    pub fn id(&self) -> &str {
        match self {
            ExactClaim::Claimed { id } | ExactClaim::Existing { id } => id,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, ExactClaim::Existing { .. })
    }
}

/// Exact key to owning id. Inserts go through the shard lock, so two racing
/// claims on the same key see exactly one winner.
#[derive(Debug, Default)]
pub struct ExactIndex {
    owners: DashMap<String, String>,
}

impl ExactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &str) -> Option<String> {
        self.owners.get(key).map(|id| id.value().clone())
    }

    /// Insert-if-absent. `allocate` runs only when the key is vacant, and
    /// runs while the shard is held.
    pub fn claim(&self, key: String, allocate: impl FnOnce() -> String) -> ExactClaim {
        match self.owners.entry(key) {
            Entry::Occupied(slot) => ExactClaim::Existing { id: slot.get().clone() },
            Entry::Vacant(slot) => {
                let id = allocate();
                slot.insert(id.clone());
                ExactClaim::Claimed { id }
            }
        }
    }

    /// Bind `key` to `owner_id`. Returns the current owner if it is someone else.
    pub fn bind(&self, key: String, owner_id: &str) -> Result<(), String> {
        match self.owners.entry(key) {
            Entry::Occupied(slot) if slot.get() != owner_id => Err(slot.get().clone()),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(owner_id.to_string());
                Ok(())
            }
        }
    }

    /// Remove `key` only if `owner_id` still owns it.
    pub fn release(&self, key: &str, owner_id: &str) -> bool {
        self.owners.remove_if(key, |_, owner| owner == owner_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn clear(&self) {
        self.owners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn claim_allocates_only_when_vacant() {
        let index = ExactIndex::new();
        let allocations = AtomicUsize::new(0);
        let alloc = || {
            allocations.fetch_add(1, Ordering::SeqCst);
            "a-1".to_string()
        };
        assert_eq!(index.claim("k".into(), alloc), ExactClaim::Claimed { id: "a-1".into() });
        let second = index.claim("k".into(), || {
            allocations.fetch_add(1, Ordering::SeqCst);
            "a-2".to_string()
        });
        assert_eq!(second, ExactClaim::Existing { id: "a-1".into() });
        assert_eq!(allocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn racing_claims_have_one_winner() {
        let index = Arc::new(ExactIndex::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || index.claim("same".into(), || format!("a-{i}")))
            })
            .collect();
        let claims: Vec<ExactClaim> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(claims.iter().filter(|c| !c.is_existing()).count(), 1);
        let winner = claims.iter().find(|c| !c.is_existing()).unwrap().id().to_string();
        assert!(claims.iter().all(|c| c.id() == winner));
    }

    #[test]
    fn release_respects_ownership() {
        let index = ExactIndex::new();
        index.bind("k".into(), "a-1").unwrap();
        assert_eq!(index.bind("k".into(), "a-2"), Err("a-1".to_string()));
        assert!(!index.release("k", "a-2"));
        assert!(index.release("k", "a-1"));
        assert!(index.is_empty());
    }
}
