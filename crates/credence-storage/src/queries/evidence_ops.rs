use rusqlite::{params, Connection, OptionalExtension};

use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::models::Evidence;

use super::map_write_err;
use crate::{corrupt, to_storage_err};

pub fn insert_evidence(conn: &Connection, evidence: &Evidence) -> CredenceResult<()> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM assertions WHERE id = ?1)",
            [evidence.assertion_id()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if !exists {
        return Err(CredenceError::InvalidEvidence {
            evidence_id: evidence.id().to_string(),
            assertion_id: evidence.assertion_id().to_string(),
        });
    }
    let body = serde_json::to_string(evidence)?;
    conn.execute(
        "INSERT INTO evidence (id, assertion_id, body, submitted_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            evidence.id(),
            evidence.assertion_id(),
            body,
            evidence.submitted_at().to_rfc3339()
        ],
    )
    .map_err(|e| map_write_err(format!("evidence:{}", evidence.id()), e))?;
    Ok(())
}

fn decode(body: &str) -> CredenceResult<Evidence> {
    serde_json::from_str(body).map_err(|e| corrupt("evidence", e.to_string()))
}

pub fn get_evidence(conn: &Connection, id: &str) -> CredenceResult<Option<Evidence>> {
    let body: Option<String> = conn
        .query_row("SELECT body FROM evidence WHERE id = ?1", [id], |row| row.get(0))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    body.as_deref().map(decode).transpose()
}

/// Evidence for an assertion in insertion order.
pub fn evidence_for(conn: &Connection, assertion_id: &str) -> CredenceResult<Vec<Evidence>> {
    let mut stmt = conn
        .prepare("SELECT body FROM evidence WHERE assertion_id = ?1 ORDER BY rowid")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let bodies = stmt
        .query_map([assertion_id], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    bodies.iter().map(|b| decode(b)).collect()
}
