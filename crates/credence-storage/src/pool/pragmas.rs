//! Connection pragmas. `freeze` and vote saves rely on `foreign_keys` and on
//! WAL letting readers run while a write transaction is open.

use rusqlite::Connection;

use credence_core::errors::CredenceResult;

use crate::to_storage_err;

const PRAGMAS: &[(&str, &str)] = &[
    ("journal_mode", "WAL"),
    ("synchronous", "NORMAL"),
    ("cache_size", "-64000"),
    ("busy_timeout", "5000"),
    ("foreign_keys", "ON"),
    ("temp_store", "MEMORY"),
];

pub fn apply_pragmas(conn: &Connection) -> CredenceResult<()> {
    for (name, value) in PRAGMAS {
        conn.pragma_update(None, name, value)
            .map_err(|e| to_storage_err(format!("PRAGMA {name} = {value}: {e}")))?;
    }
    Ok(())
}

/// In-memory databases report "memory" and return false.
pub fn verify_wal_mode(conn: &Connection) -> CredenceResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
