//! Tier 2: near-duplicates.
//!
//! Text goes through MinHash LSH over word shingles. Binary media goes
//! through a 64-bit difference hash compared by Hamming distance. Both
//! indexes are eventually consistent: two near-simultaneous submissions
//! may both pass, and review resolves them later.

pub mod minhash;
pub mod perceptual;

pub use minhash::{MinHashIndex, MinHasher};
pub use perceptual::{dhash, hamming_similarity, PerceptualIndex};
