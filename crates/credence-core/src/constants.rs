/// Credence system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Weight every assertion starts at, and stays at until evidence or a
/// resolved challenge moves it.
pub const PROVISIONAL_WEIGHT: f64 = 0.5;

/// The "high-credibility" line. Only a promotion may put a weight at or above it.
pub const HIGH_CREDIBILITY_THRESHOLD: f64 = 0.90;

/// Maximum number of assertions accepted by one batch scoring call.
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Component name used in degradation events raised by the semantic dedup tier.
pub const SEMANTIC_TIER_COMPONENT: &str = "dedup.semantic";
