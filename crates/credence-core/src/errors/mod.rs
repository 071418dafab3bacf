//! Error taxonomy.
//!
//! `CredenceError` is the single error type crossing crate boundaries.
//! Subsystem errors convert into it with `?`. Every variant maps onto one
//! [`ErrorKind`] so callers can branch on the category without matching
//! every variant.

mod challenge_error;
mod embedding_error;
mod promotion_error;
mod storage_error;

pub use challenge_error::ChallengeError;
pub use embedding_error::EmbeddingError;
pub use promotion_error::PromotionError;
pub use storage_error::StorageError;

/// Result alias used throughout the workspace.
pub type CredenceResult<T> = Result<T, CredenceError>;

/// Coarse error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Surfaces immediately.
    Validation,
    /// Missing assertion or challenge. Surfaces immediately.
    NotFound,
    /// Duplicate vote race or concurrent promotion race.
    Conflict,
    /// Write attempted on a frozen assertion.
    ImmutabilityViolation,
    /// A dependency was skipped. Informational, never fatal.
    DegradedService,
    /// Storage, serialization, or configuration failure.
    Internal,
}

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum CredenceError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("assertion not found: {id}")]
    AssertionNotFound { id: String },

    #[error("challenge not found: {id}")]
    ChallengeNotFound { id: String },

    #[error("invalid evidence {evidence_id}: references unknown assertion {assertion_id}")]
    InvalidEvidence {
        evidence_id: String,
        assertion_id: String,
    },

    #[error("assertion {assertion_id} is immutable: {operation} rejected")]
    ImmutabilityViolation {
        assertion_id: String,
        operation: String,
    },

    #[error("conflict on {resource}: {reason}")]
    Conflict { resource: String, reason: String },

    #[error("degraded service: {component}: {reason}")]
    DegradedService { component: String, reason: String },

    #[error("challenge error: {0}")]
    ChallengeError(#[from] ChallengeError),

    #[error("promotion error: {0}")]
    PromotionError(#[from] PromotionError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl CredenceError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CredenceError::ValidationError(_) | CredenceError::InvalidEvidence { .. } => {
                ErrorKind::Validation
            }
            CredenceError::AssertionNotFound { .. } | CredenceError::ChallengeNotFound { .. } => {
                ErrorKind::NotFound
            }
            CredenceError::ImmutabilityViolation { .. } => ErrorKind::ImmutabilityViolation,
            CredenceError::Conflict { .. } => ErrorKind::Conflict,
            CredenceError::DegradedService { .. } | CredenceError::EmbeddingError(_) => {
                ErrorKind::DegradedService
            }
            CredenceError::ChallengeError(e) => e.kind(),
            CredenceError::PromotionError(e) => e.kind(),
            CredenceError::StorageError(_)
            | CredenceError::SerializationError(_)
            | CredenceError::ConfigError(_) => ErrorKind::Internal,
        }
    }

    /// A lost optimistic-concurrency race. Retrying after a reload may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CredenceError::Conflict { .. })
    }

    /// Shorthand for an immutability violation.
    pub fn immutable(assertion_id: impl Into<String>, operation: impl Into<String>) -> Self {
        CredenceError::ImmutabilityViolation {
            assertion_id: assertion_id.into(),
            operation: operation.into(),
        }
    }

    /// Shorthand for a version conflict.
    pub fn version_conflict(resource: impl Into<String>, expected: u64, actual: u64) -> Self {
        CredenceError::Conflict {
            resource: resource.into(),
            reason: format!("expected version {expected}, found {actual}"),
        }
    }
}
