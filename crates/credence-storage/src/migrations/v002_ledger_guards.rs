//! v002: triggers that make the ledger append-only and frozen rows read-only.

use rusqlite::Connection;

use credence_core::errors::CredenceResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CredenceResult<()> {
    conn.execute_batch(
        "
        CREATE TRIGGER IF NOT EXISTS promotion_events_no_update
        BEFORE UPDATE ON promotion_events
        BEGIN
            SELECT RAISE(ABORT, 'promotion_events is append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS promotion_events_no_delete
        BEFORE DELETE ON promotion_events
        BEGIN
            SELECT RAISE(ABORT, 'promotion_events is append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS assertions_frozen_guard
        BEFORE UPDATE ON assertions
        WHEN OLD.immutable = 1
        BEGIN
            SELECT RAISE(ABORT, 'assertion is immutable');
        END;

        CREATE TRIGGER IF NOT EXISTS assertions_no_delete_frozen
        BEFORE DELETE ON assertions
        WHEN OLD.immutable = 1
        BEGIN
            SELECT RAISE(ABORT, 'assertion is immutable');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
