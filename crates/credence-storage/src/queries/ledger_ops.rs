//! Append-only promotion ledger. No update or delete path exists here, and
//! the v002 triggers reject both at the database level.

use rusqlite::{params, Connection};

use credence_core::errors::CredenceResult;
use credence_core::models::PromotionEvent;

use super::map_write_err;
use crate::{corrupt, to_storage_err};

/// Append `event`; the ledger assigns its sequence number.
pub fn append(conn: &Connection, event: &PromotionEvent) -> CredenceResult<u64> {
    let body = serde_json::to_string(event)?;
    conn.execute(
        "INSERT INTO promotion_events (id, assertion_id, body, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![event.id, event.assertion_id, body, event.timestamp.to_rfc3339()],
    )
    .map_err(|e| map_write_err(format!("promotion_event:{}", event.id), e))?;
    Ok(conn.last_insert_rowid() as u64)
}

fn query(conn: &Connection, sql: &str, arg: Option<&str>) -> CredenceResult<Vec<PromotionEvent>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(i64, String)> { Ok((row.get(0)?, row.get(1)?)) };
    let rows = match arg {
        Some(a) => stmt.query_map([a], map),
        None => stmt.query_map([], map),
    }
    .map_err(|e| to_storage_err(e.to_string()))?
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| to_storage_err(e.to_string()))?;

    rows.into_iter()
        .map(|(sequence, body)| {
            let mut event: PromotionEvent =
                serde_json::from_str(&body).map_err(|e| corrupt("promotion_events", e.to_string()))?;
            event.sequence = sequence as u64;
            Ok(event)
        })
        .collect()
}

pub fn events_for(conn: &Connection, assertion_id: &str) -> CredenceResult<Vec<PromotionEvent>> {
    query(
        conn,
        "SELECT sequence, body FROM promotion_events WHERE assertion_id = ?1 ORDER BY sequence",
        Some(assertion_id),
    )
}

pub fn all_events(conn: &Connection) -> CredenceResult<Vec<PromotionEvent>> {
    query(conn, "SELECT sequence, body FROM promotion_events ORDER BY sequence", None)
}
