use std::sync::Arc;

use credence_core::clock::{Clock, SystemClock};
use credence_core::config::CredenceConfig;
use credence_core::traits::IEmbeddingProvider;

/// Default event bus capacity per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Everything an engine needs besides its store and reputation source.
#[derive(Clone)]
pub struct EngineOptions {
    pub config: CredenceConfig,
    pub clock: Arc<dyn Clock>,
    /// Backs the semantic dedup tier. `None` disables that tier.
    pub embedder: Option<Arc<dyn IEmbeddingProvider>>,
    pub event_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            config: CredenceConfig::default(),
            clock: Arc::new(SystemClock),
            embedder: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EngineOptions {
    pub fn with_config(mut self, config: CredenceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }
}
