//! Tracing setup: structured logging and domain event functions.

pub mod events;

use credence_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable read by [`init_tracing`].
pub const LOG_ENV_VAR: &str = "CREDENCE_LOG";

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects the `CREDENCE_LOG` environment variable for filtering.
/// Defaults to `info` level if not set. A no-op if a global subscriber
/// is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init();
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .try_init();
}

/// Initialize from the `[observability]` config section. `CREDENCE_LOG`
/// still wins when set.
pub fn init_tracing_from_config(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let _ = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
