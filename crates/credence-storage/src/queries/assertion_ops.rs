use rusqlite::{params, Connection, OptionalExtension};

use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::models::{Assertion, PromotionEvent};
use credence_core::weight::Weight;

use super::{ledger_ops, map_write_err, parse_time};
use crate::{corrupt, to_storage_err};

pub fn insert_assertion(conn: &Connection, a: &Assertion) -> CredenceResult<()> {
    let payload = serde_json::to_string(&a.payload)?;
    let fingerprints = serde_json::to_string(&a.fingerprints)?;
    let review_matches = serde_json::to_string(&a.review_matches)?;
    let methodology = serde_json::to_string(&a.methodology)?;
    conn.execute(
        "INSERT INTO assertions (
            id, payload, weight, immutable, version, content_hash, fingerprints, methodology, created_at,
            review_matches
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            a.id,
            payload,
            a.weight.value(),
            a.immutable as i32,
            a.version as i64,
            a.content_hash,
            fingerprints,
            methodology,
            a.created_at.to_rfc3339(),
            review_matches,
        ],
    )
    .map_err(|e| map_write_err(format!("assertion:{}", a.id), e))?;
    Ok(())
}

pub fn get_assertion(conn: &Connection, id: &str) -> CredenceResult<Option<Assertion>> {
    let row = conn
        .query_row(
            "SELECT id, payload, weight, immutable, version, content_hash, fingerprints, methodology, created_at,
                    review_matches
             FROM assertions WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i32>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                    row.get::<_, String>(8)?,
                    row.get::<_, String>(9)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let Some((id, payload, weight, immutable, version, content_hash, fingerprints, methodology, created_at, review)) =
        row
    else {
        return Ok(None);
    };
    Ok(Some(Assertion {
        payload: serde_json::from_str(&payload).map_err(|e| corrupt("assertions", e.to_string()))?,
        weight: Weight::new(weight),
        immutable: immutable != 0,
        version: version as u64,
        content_hash,
        fingerprints: serde_json::from_str(&fingerprints).map_err(|e| corrupt("assertions", e.to_string()))?,
        review_matches: serde_json::from_str(&review).map_err(|e| corrupt("assertions", e.to_string()))?,
        methodology: serde_json::from_str(&methodology).map_err(|e| corrupt("assertions", e.to_string()))?,
        created_at: parse_time("assertions", &created_at)?,
        id,
    }))
}

fn state_of(conn: &Connection, id: &str) -> CredenceResult<Option<(bool, u64)>> {
    conn.query_row("SELECT immutable, version FROM assertions WHERE id = ?1", [id], |row| {
        Ok((row.get::<_, i32>(0)? != 0, row.get::<_, i64>(1)? as u64))
    })
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn update_weight(conn: &Connection, id: &str, weight: Weight, expected_version: u64) -> CredenceResult<u64> {
    // Classify first so a frozen row reports immutability, not a trigger abort.
    match state_of(conn, id)? {
        None => return Err(CredenceError::AssertionNotFound { id: id.to_string() }),
        Some((true, _)) => return Err(CredenceError::immutable(id, "update_weight")),
        Some((false, _)) => {}
    }
    let changed = conn
        .execute(
            "UPDATE assertions SET weight = ?1, version = version + 1
             WHERE id = ?2 AND version = ?3 AND immutable = 0",
            params![weight.value(), id, expected_version as i64],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 1 {
        return Ok(expected_version + 1);
    }
    match state_of(conn, id)? {
        None => Err(CredenceError::AssertionNotFound { id: id.to_string() }),
        Some((true, _)) => Err(CredenceError::immutable(id, "update_weight")),
        Some((false, actual)) => Err(CredenceError::version_conflict(format!("assertion:{id}"), expected_version, actual)),
    }
}

/// Compare-and-set the immutable flag and append the ledger entry in one
/// transaction. Returns `false`, writing nothing, if already frozen.
pub fn freeze(conn: &Connection, id: &str, event: &PromotionEvent) -> CredenceResult<bool> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("freeze begin: {e}")))?;

    let changed = tx
        .execute(
            "UPDATE assertions SET immutable = 1, weight = ?1, version = version + 1
             WHERE id = ?2 AND immutable = 0",
            params![event.final_weight.value(), id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if changed == 0 {
        let exists = state_of(&tx, id)?.is_some();
        let _ = tx.rollback();
        return if exists {
            Ok(false)
        } else {
            Err(CredenceError::AssertionNotFound { id: id.to_string() })
        };
    }

    if let Err(e) = ledger_ops::append(&tx, event) {
        let _ = tx.rollback();
        return Err(e);
    }
    tx.commit().map_err(|e| to_storage_err(format!("freeze commit: {e}")))?;
    Ok(true)
}

pub fn assertion_ids(conn: &Connection) -> CredenceResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT id FROM assertions ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
