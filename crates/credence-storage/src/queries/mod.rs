//! SQL for each table. Every function takes a `&Connection`, so callers may
//! pass a transaction.

pub mod assertion_ops;
pub mod challenge_ops;
pub mod evidence_ops;
pub mod ledger_ops;

use chrono::{DateTime, Utc};
use rusqlite::ErrorCode;

use credence_core::errors::{CredenceError, CredenceResult};

use crate::{corrupt, to_storage_err};

pub(crate) fn parse_time(table: &str, raw: &str) -> CredenceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("bad timestamp '{raw}': {e}")))
}

/// Map a rusqlite error, turning uniqueness violations into `Conflict`.
pub(crate) fn map_write_err(resource: String, e: rusqlite::Error) -> CredenceError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => CredenceError::Conflict {
            resource,
            reason: e.to_string(),
        },
        _ => to_storage_err(e.to_string()),
    }
}
