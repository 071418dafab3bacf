//! Background task that resolves challenges whose deadline passed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::engine::CredenceEngine;

impl CredenceEngine {
    /// Run [`CredenceEngine::sweep_deadlines`] every `interval` until the
    /// handle is aborted. Sweeps touch the store, so each one runs on the
    /// blocking pool.
    pub fn spawn_deadline_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval_ms = interval.as_millis() as u64, "deadline sweeper started");
            loop {
                ticker.tick().await;
                let engine = Arc::clone(&engine);
                match tokio::task::spawn_blocking(move || engine.sweep_deadlines()).await {
                    Ok(Ok(resolved)) if resolved.is_empty() => {}
                    Ok(Ok(resolved)) => debug!(resolved = resolved.len(), "deadline sweep resolved challenges"),
                    Ok(Err(e)) => warn!(error = %e, "deadline sweep failed"),
                    Err(e) => warn!(error = %e, "deadline sweep task panicked"),
                }
            }
        })
    }

    /// Sweeper at the configured `sweep_interval_secs`.
    pub fn spawn_configured_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        self.spawn_deadline_sweeper(Duration::from_secs(self.config.challenge.sweep_interval_secs))
    }
}
