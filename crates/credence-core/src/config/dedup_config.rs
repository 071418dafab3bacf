use serde::{Deserialize, Serialize};

use super::defaults;

/// Deduplication index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Estimated Jaccard overlap for a near-duplicate text hit.
    pub near_duplicate_threshold: f64,
    /// Perceptual-hash similarity for a near-duplicate binary hit.
    pub perceptual_threshold: f64,
    /// Cosine similarity for a semantic hit.
    pub semantic_threshold: f64,
    /// Words per shingle.
    pub shingle_size: usize,
    /// MinHash permutations; must be divisible by `minhash_bands`.
    pub minhash_permutations: usize,
    pub minhash_bands: usize,
    /// Upper bound on one embedding lookup.
    pub semantic_timeout_ms: u64,
    pub semantic_enabled: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            near_duplicate_threshold: defaults::DEFAULT_NEAR_DUPLICATE_THRESHOLD,
            perceptual_threshold: defaults::DEFAULT_PERCEPTUAL_THRESHOLD,
            semantic_threshold: defaults::DEFAULT_SEMANTIC_THRESHOLD,
            shingle_size: defaults::DEFAULT_SHINGLE_SIZE,
            minhash_permutations: defaults::DEFAULT_MINHASH_PERMUTATIONS,
            minhash_bands: defaults::DEFAULT_MINHASH_BANDS,
            semantic_timeout_ms: defaults::DEFAULT_SEMANTIC_TIMEOUT_MS,
            semantic_enabled: defaults::DEFAULT_SEMANTIC_ENABLED,
        }
    }
}
