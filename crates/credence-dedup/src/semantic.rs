//! Tier 3: embedding nearest neighbors.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::debug;

use credence_core::errors::EmbeddingError;
use credence_core::traits::IEmbeddingProvider;

/// Cosine similarity, 0.0 for empty, mismatched, or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let (dot, na, nb) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |(d, x2, y2), (&x, &y)| {
        let (x, y) = (x as f64, y as f64);
        (d + x * y, x2 + x * x, y2 + y * y)
    });
    let denom = na.sqrt() * nb.sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Owner id to embedding.
#[derive(Debug, Default)]
pub struct SemanticIndex {
    vectors: DashMap<String, Vec<f32>>,
}

impl SemanticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, vector: Vec<f32>) {
        self.vectors.insert(id.to_string(), vector);
    }

    pub fn remove(&self, id: &str) -> bool {
        self.vectors.remove(id).is_some()
    }

    /// Every indexed vector at or above `threshold`, best first.
    pub fn nearest(&self, query: &[f32], threshold: f64) -> Vec<(String, f64)> {
        let snapshot: Vec<(String, Vec<f32>)> = self
            .vectors
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let mut hits: Vec<(String, f64)> = snapshot
            .into_par_iter()
            .filter_map(|(id, v)| {
                let score = cosine_similarity(query, &v);
                (score >= threshold).then_some((id, score))
            })
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn clear(&self) {
        self.vectors.clear();
    }
}

/// What one embedding lookup produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedOutcome {
    /// No provider configured, or the tier is switched off.
    Disabled,
    Vector(Vec<f32>),
    /// The provider was configured but could not answer in time.
    Degraded { reason: String },
}

/// Bounded access to the embedding provider.
#[derive(Clone)]
pub struct EmbeddingGate {
    provider: Option<Arc<dyn IEmbeddingProvider>>,
    timeout: Duration,
    enabled: bool,
}

impl EmbeddingGate {
    pub fn new(provider: Option<Arc<dyn IEmbeddingProvider>>, timeout: Duration, enabled: bool) -> Self {
        Self {
            provider,
            timeout,
            enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.provider.is_some()
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    /// Embed `text` on the blocking pool, giving up after the timeout.
    /// Never returns an error: every failure becomes `Degraded`.
    pub async fn embed(&self, text: &str) -> EmbedOutcome {
        let provider = match (&self.provider, self.enabled) {
            (Some(p), true) => Arc::clone(p),
            _ => return EmbedOutcome::Disabled,
        };
        if !provider.is_available() {
            return degraded(EmbeddingError::ProviderUnavailable {
                provider: provider.name().to_string(),
            });
        }

        let expected = provider.dimensions();
        let owned = text.to_string();
        let task = tokio::task::spawn_blocking(move || provider.embed(&owned));
        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => degraded(EmbeddingError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            Ok(Err(join)) => EmbedOutcome::Degraded {
                reason: format!("embedding task failed: {join}"),
            },
            Ok(Ok(Err(e))) => EmbedOutcome::Degraded { reason: e.to_string() },
            Ok(Ok(Ok(v))) if v.len() != expected => degraded(EmbeddingError::DimensionMismatch {
                expected,
                actual: v.len(),
            }),
            Ok(Ok(Ok(v))) => {
                debug!(dims = v.len(), "embedded candidate");
                EmbedOutcome::Vector(v)
            }
        }
    }
}

fn degraded(e: EmbeddingError) -> EmbedOutcome {
    EmbedOutcome::Degraded { reason: e.to_string() }
}
