use crate::errors::CredenceResult;

/// Embedding service backing the semantic dedup tier.
///
/// Calls run on the blocking pool under a timeout, so implementations may
/// block on I/O.
pub trait IEmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> CredenceResult<Vec<f32>>;

    /// Length of every vector `embed` returns. A mismatch counts as a failure.
    fn dimensions(&self) -> usize;

    fn name(&self) -> &str;

    /// Checked before each call; `false` degrades without calling `embed`.
    fn is_available(&self) -> bool;
}
