//! v003: keep the dedup matches that flagged an assertion for review.

use rusqlite::Connection;

use credence_core::errors::CredenceResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CredenceResult<()> {
    conn.execute_batch("ALTER TABLE assertions ADD COLUMN review_matches TEXT NOT NULL DEFAULT '[]';")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
