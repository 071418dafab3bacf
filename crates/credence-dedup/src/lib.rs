//! # credence-dedup
//!
//! Duplicate detection for assertions and evidence, cheapest tier first:
//! 1. Exact: blake3 over the canonical form, atomic insert-if-absent.
//! 2. Near-duplicate: MinHash LSH over word shingles for text, a 64-bit
//!    difference hash for binary media.
//! 3. Semantic: cosine nearest neighbor over embeddings, with a timeout.
//!
//! Only the exact tier recommends a merge. A failing embedding service
//! marks the result degraded instead of failing the check.

pub mod canonical;
pub mod exact;
pub mod index;
pub mod near;
pub mod semantic;

pub use exact::{ExactClaim, ExactIndex};
pub use index::DedupIndex;
pub use semantic::{cosine_similarity, EmbedOutcome, EmbeddingGate, SemanticIndex};

/// Component name used for degradation records.
pub const SEMANTIC_COMPONENT: &str = credence_core::constants::SEMANTIC_TIER_COMPONENT;
