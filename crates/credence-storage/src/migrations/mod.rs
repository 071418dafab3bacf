//! Versioned schema migrations, recorded in `schema_version`.

mod v001_initial_schema;
mod v002_ledger_guards;
mod v003_review_matches;

use rusqlite::Connection;
use tracing::info;

use credence_core::errors::{CredenceError, CredenceResult, StorageError};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> CredenceResult<()>;

const MIGRATIONS: &[(u32, MigrationFn)] = &[
    (1, v001_initial_schema::migrate),
    (2, v002_ledger_guards::migrate),
    (3, v003_review_matches::migrate),
];

/// Latest schema version this build knows.
pub const LATEST_VERSION: u32 = 3;

pub fn current_version(conn: &Connection) -> CredenceResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Apply every pending migration, each in its own transaction.
/// Returns the number applied.
pub fn run_migrations(conn: &Connection) -> CredenceResult<usize> {
    let current = current_version(conn)?;
    let mut applied = 0;
    for (version, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let failed = |reason: String| {
            CredenceError::StorageError(StorageError::MigrationFailed {
                version: *version,
                reason,
            })
        };
        let tx = conn.unchecked_transaction().map_err(|e| failed(e.to_string()))?;
        migrate(&tx).map_err(|e| failed(e.to_string()))?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
            .map_err(|e| failed(e.to_string()))?;
        tx.commit().map_err(|e| failed(e.to_string()))?;
        info!(version, "applied schema migration");
        applied += 1;
    }
    Ok(applied)
}
