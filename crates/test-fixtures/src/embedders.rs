use std::time::Duration;

use credence_core::errors::{CredenceResult, EmbeddingError};
use credence_core::traits::IEmbeddingProvider;

/// Deterministic bag-of-words embedding: each lowercase token bumps one
/// blake3-chosen dimension, then the vector is L2-normalized. Texts sharing
/// most of their words land close together.
#[derive(Debug, Clone)]
pub struct WorkingEmbedder {
    dims: usize,
}

impl WorkingEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl Default for WorkingEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl IEmbeddingProvider for WorkingEmbedder {
    fn embed(&self, text: &str) -> CredenceResult<Vec<f32>> {
        let mut v = vec![0.0f32; self.dims];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let idx = u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]) as usize
                % self.dims;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "working-mock"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Available, but every call fails.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder;

impl IEmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> CredenceResult<Vec<f32>> {
        Err(EmbeddingError::InferenceFailed {
            reason: "mock inference failure".to_string(),
        }
        .into())
    }

    fn dimensions(&self) -> usize {
        64
    }

    fn name(&self) -> &str {
        "failing-mock"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Reports itself unavailable.
#[derive(Debug, Clone, Default)]
pub struct UnavailableEmbedder;

impl IEmbeddingProvider for UnavailableEmbedder {
    fn embed(&self, _text: &str) -> CredenceResult<Vec<f32>> {
        Err(EmbeddingError::ProviderUnavailable {
            provider: self.name().to_string(),
        }
        .into())
    }

    fn dimensions(&self) -> usize {
        64
    }

    fn name(&self) -> &str {
        "unavailable-mock"
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Sleeps before delegating to a [`WorkingEmbedder`].
#[derive(Debug, Clone)]
pub struct SlowEmbedder {
    delay: Duration,
    inner: WorkingEmbedder,
}

impl SlowEmbedder {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: WorkingEmbedder::default(),
        }
    }
}

impl IEmbeddingProvider for SlowEmbedder {
    fn embed(&self, text: &str) -> CredenceResult<Vec<f32>> {
        std::thread::sleep(self.delay);
        self.inner.embed(text)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        "slow-mock"
    }

    fn is_available(&self) -> bool {
        true
    }
}
