//! v001: assertions, evidence, challenges, votes, promotion_events.

use rusqlite::Connection;

use credence_core::errors::CredenceResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CredenceResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS assertions (
            id           TEXT PRIMARY KEY,
            payload      TEXT NOT NULL,
            weight       REAL NOT NULL CHECK (weight >= 0.0 AND weight <= 1.0),
            immutable    INTEGER NOT NULL DEFAULT 0,
            version      INTEGER NOT NULL DEFAULT 0,
            content_hash TEXT NOT NULL,
            fingerprints TEXT NOT NULL DEFAULT '[]',
            methodology  TEXT NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assertions_hash ON assertions(content_hash);

        CREATE TABLE IF NOT EXISTS evidence (
            id           TEXT PRIMARY KEY,
            assertion_id TEXT NOT NULL REFERENCES assertions(id),
            body         TEXT NOT NULL,
            submitted_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_evidence_assertion ON evidence(assertion_id);

        CREATE TABLE IF NOT EXISTS challenges (
            id           TEXT PRIMARY KEY,
            assertion_id TEXT NOT NULL REFERENCES assertions(id),
            topic        TEXT NOT NULL,
            raised_by    TEXT NOT NULL,
            reason       TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            deadline     TEXT NOT NULL,
            state        TEXT NOT NULL,
            version      INTEGER NOT NULL DEFAULT 0,
            outcome      TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_challenges_assertion ON challenges(assertion_id);
        CREATE INDEX IF NOT EXISTS idx_challenges_state ON challenges(state);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_challenges_live_topic
            ON challenges(assertion_id, topic) WHERE state IN ('open', 'voting');

        CREATE TABLE IF NOT EXISTS votes (
            id           TEXT NOT NULL,
            challenge_id TEXT NOT NULL REFERENCES challenges(id),
            voter_id     TEXT NOT NULL,
            reputation   REAL NOT NULL,
            choice       TEXT NOT NULL,
            confidence   REAL NOT NULL CHECK (confidence > 0.0 AND confidence <= 1.0),
            cast_at      TEXT NOT NULL,
            UNIQUE (challenge_id, voter_id)
        );

        CREATE TABLE IF NOT EXISTS promotion_events (
            sequence     INTEGER PRIMARY KEY AUTOINCREMENT,
            id           TEXT NOT NULL UNIQUE,
            assertion_id TEXT NOT NULL REFERENCES assertions(id),
            body         TEXT NOT NULL,
            timestamp    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_promotion_assertion ON promotion_events(assertion_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
