// Single source of truth for all default values.

// --- Scoring ---
pub const DEFAULT_LOGISTIC_STEEPNESS: f64 = 1.0;
pub const DEFAULT_DECAY_RATE_PER_DAY: f64 = 0.0;
pub const DEFAULT_CHALLENGE_IMPACT: f64 = 0.3;
pub const DEFAULT_PARTICIPATION_SCALE: f64 = 10.0;
pub const DEFAULT_EXPIRED_DISMISSAL_FACTOR: f64 = 0.1;
pub const DEFAULT_CEILING_MARGIN: f64 = 0.001;
pub const DEFAULT_WEIGHT_CACHE_CAPACITY: u64 = 100_000;

// --- Challenge ---
pub const STRICT_SUPERMAJORITY: f64 = 0.99;
pub const TWO_THIRDS_SUPERMAJORITY: f64 = 2.0 / 3.0;
pub const DEFAULT_MIN_REVIEW_PERIOD_SECS: u64 = 86_400; // 1 day
pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 604_800; // 7 days
pub const DEFAULT_AMBIGUOUS_BAND_LOW: f64 = 0.4;
pub const DEFAULT_AMBIGUOUS_BAND_HIGH: f64 = 0.6;
pub const DEFAULT_MIN_VOTES: u32 = 1;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300; // 5 minutes

// --- Dedup ---
pub const DEFAULT_NEAR_DUPLICATE_THRESHOLD: f64 = 0.8;
pub const DEFAULT_PERCEPTUAL_THRESHOLD: f64 = 0.9;
pub const DEFAULT_SEMANTIC_THRESHOLD: f64 = 0.85;
pub const DEFAULT_SHINGLE_SIZE: usize = 3;
pub const DEFAULT_MINHASH_PERMUTATIONS: usize = 128;
pub const DEFAULT_MINHASH_BANDS: usize = 32;
pub const DEFAULT_SEMANTIC_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_SEMANTIC_ENABLED: bool = true;

// --- Promotion ---
pub const DEFAULT_METHODOLOGY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_CONSENSUS_THRESHOLD: f64 = 0.8;
pub const DEFAULT_EVIDENCE_QUALITY_THRESHOLD: f64 = 0.8;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
