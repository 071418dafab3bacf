//! Difference hash for binary media.
//!
//! The bytes are read as a one-dimensional intensity signal, averaged down
//! to 65 samples, and each bit records whether a sample is brighter than the
//! next. Re-encodings that shift values slightly keep most bits. Inputs too
//! short to fill the samples, and signals with no falling edge, have no
//! hash: every one of them would collapse onto 0.

use dashmap::DashMap;

const SAMPLES: usize = 65;

/// Shortest input that gets a perceptual hash.
pub const MIN_BYTES: usize = SAMPLES;

pub fn dhash(bytes: &[u8]) -> Option<u64> {
    if bytes.len() < MIN_BYTES {
        return None;
    }
    let len = bytes.len();
    let samples: Vec<f64> = (0..SAMPLES)
        .map(|i| {
            let start = (i * len / SAMPLES).min(len - 1);
            let end = ((i + 1) * len / SAMPLES).clamp(start + 1, len);
            let window = &bytes[start..end];
            window.iter().map(|&b| b as f64).sum::<f64>() / window.len() as f64
        })
        .collect();
    let hash = samples
        .windows(2)
        .enumerate()
        .fold(0u64, |hash, (bit, pair)| if pair[0] > pair[1] { hash | (1 << bit) } else { hash });
    (hash != 0).then_some(hash)
}

/// 1 minus the fraction of differing bits.
pub fn hamming_similarity(a: u64, b: u64) -> f64 {
    1.0 - (a ^ b).count_ones() as f64 / 64.0
}

/// Owner id to perceptual hash. Queries scan linearly.
#[derive(Debug, Default)]
pub struct PerceptualIndex {
    hashes: DashMap<String, u64>,
}

impl PerceptualIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, hash: u64) {
        self.hashes.insert(id.to_string(), hash);
    }

    pub fn remove(&self, id: &str) -> bool {
        self.hashes.remove(id).is_some()
    }

    pub fn query(&self, hash: u64, threshold: f64) -> Vec<(String, f64)> {
        let mut hits: Vec<(String, f64)> = self
            .hashes
            .iter()
            .filter_map(|entry| {
                let score = hamming_similarity(hash, *entry.value());
                (score >= threshold).then(|| (entry.key().clone(), score))
            })
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    pub fn clear(&self) {
        self.hashes.clear();
    }
}
