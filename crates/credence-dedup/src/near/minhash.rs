//! MinHash signatures with LSH banding.

use std::collections::HashSet;

use dashmap::DashMap;
use xxhash_rust::xxh3::xxh3_64;

use credence_core::errors::{CredenceError, CredenceResult};

/// 2^61 - 1.
const MERSENNE_61: u64 = (1u64 << 61) - 1;

fn splitmix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Fixed family of `permutations` hash functions `(a·x + b) mod p`, split
/// into `bands` LSH bands of equal width.
#[derive(Debug, Clone)]
pub struct MinHasher {
    coefficients: Vec<(u64, u64)>,
    bands: usize,
    rows: usize,
}

impl MinHasher {
    pub fn new(permutations: usize, bands: usize) -> CredenceResult<Self> {
        if permutations == 0 || bands == 0 || permutations % bands != 0 {
            return Err(CredenceError::ValidationError(format!(
                "minhash needs permutations ({permutations}) divisible by bands ({bands})"
            )));
        }
        let coefficients = (0..permutations as u64)
            .map(|i| (splitmix(2 * i) | 1, splitmix(2 * i + 1)))
            .collect();
        Ok(Self {
            coefficients,
            bands,
            rows: permutations / bands,
        })
    }

    pub fn permutations(&self) -> usize {
        self.coefficients.len()
    }

    pub fn signature(&self, shingles: &HashSet<String>) -> Vec<u64> {
        let mut sig = vec![u64::MAX; self.coefficients.len()];
        for shingle in shingles {
            let x = xxh3_64(shingle.as_bytes());
            for (slot, &(a, b)) in sig.iter_mut().zip(&self.coefficients) {
                let h = a.wrapping_mul(x).wrapping_add(b) % MERSENNE_61;
                *slot = (*slot).min(h);
            }
        }
        sig
    }

    /// One bucket key per band.
    pub fn band_keys(&self, signature: &[u64]) -> Vec<u64> {
        signature
            .chunks(self.rows)
            .take(self.bands)
            .map(|band| band.iter().fold(0u64, |h, &v| h.wrapping_mul(31).wrapping_add(v)))
            .collect()
    }

    /// Fraction of agreeing slots, an estimate of Jaccard similarity.
    pub fn estimate(a: &[u64], b: &[u64]) -> f64 {
        if a.is_empty() || a.len() != b.len() {
            return 0.0;
        }
        let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
        same as f64 / a.len() as f64
    }
}

/// Concurrent LSH index from owner id to signature.
#[derive(Debug)]
pub struct MinHashIndex {
    hasher: MinHasher,
    signatures: DashMap<String, Vec<u64>>,
    buckets: DashMap<(usize, u64), Vec<String>>,
}

impl MinHashIndex {
    pub fn new(hasher: MinHasher) -> Self {
        Self {
            hasher,
            signatures: DashMap::new(),
            buckets: DashMap::new(),
        }
    }

    pub fn hasher(&self) -> &MinHasher {
        &self.hasher
    }

    /// Index `signature` under `id`, replacing any earlier one.
    pub fn insert(&self, id: &str, signature: Vec<u64>) {
        if signature.len() != self.hasher.permutations() {
            tracing::warn!(id, len = signature.len(), "ignoring minhash signature of the wrong width");
            return;
        }
        self.remove(id);
        for (band, key) in self.hasher.band_keys(&signature).into_iter().enumerate() {
            self.buckets.entry((band, key)).or_default().push(id.to_string());
        }
        self.signatures.insert(id.to_string(), signature);
    }

    pub fn remove(&self, id: &str) -> bool {
        let Some((_, signature)) = self.signatures.remove(id) else {
            return false;
        };
        for (band, key) in self.hasher.band_keys(&signature).into_iter().enumerate() {
            if let Some(mut members) = self.buckets.get_mut(&(band, key)) {
                members.retain(|m| m != id);
            }
            self.buckets.remove_if(&(band, key), |_, members| members.is_empty());
        }
        true
    }

    /// Indexed ids sharing a band with `signature` whose estimated
    /// similarity is at least `threshold`, best first.
    pub fn query(&self, signature: &[u64], threshold: f64) -> Vec<(String, f64)> {
        let mut candidates: HashSet<String> = HashSet::new();
        for (band, key) in self.hasher.band_keys(signature).into_iter().enumerate() {
            if let Some(members) = self.buckets.get(&(band, key)) {
                candidates.extend(members.iter().cloned());
            }
        }
        let mut hits: Vec<(String, f64)> = candidates
            .into_iter()
            .filter_map(|id| {
                let score = MinHasher::estimate(signature, self.signatures.get(&id)?.value());
                (score >= threshold).then_some((id, score))
            })
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn clear(&self) {
        self.signatures.clear();
        self.buckets.clear();
    }
}
