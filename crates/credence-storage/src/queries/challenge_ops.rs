use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension, Row};

use credence_core::errors::{CredenceError, CredenceResult};
use credence_core::models::{Challenge, ChallengeState, Vote, VoteChoice};

use super::{map_write_err, parse_time};
use crate::{corrupt, to_storage_err};

const CHALLENGE_COLUMNS: &str =
    "id, assertion_id, topic, raised_by, reason, created_at, deadline, state, version, outcome";

struct ChallengeRow {
    id: String,
    assertion_id: String,
    topic: String,
    raised_by: String,
    reason: String,
    created_at: String,
    deadline: String,
    state: String,
    version: i64,
    outcome: Option<String>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<ChallengeRow> {
    Ok(ChallengeRow {
        id: row.get(0)?,
        assertion_id: row.get(1)?,
        topic: row.get(2)?,
        raised_by: row.get(3)?,
        reason: row.get(4)?,
        created_at: row.get(5)?,
        deadline: row.get(6)?,
        state: row.get(7)?,
        version: row.get(8)?,
        outcome: row.get(9)?,
    })
}

fn choice_str(choice: VoteChoice) -> &'static str {
    match choice {
        VoteChoice::Sustain => "sustain",
        VoteChoice::Dismiss => "dismiss",
        VoteChoice::Abstain => "abstain",
    }
}

fn parse_choice(raw: &str) -> CredenceResult<VoteChoice> {
    match raw {
        "sustain" => Ok(VoteChoice::Sustain),
        "dismiss" => Ok(VoteChoice::Dismiss),
        "abstain" => Ok(VoteChoice::Abstain),
        other => Err(corrupt("votes", format!("unknown choice '{other}'"))),
    }
}

fn load_votes(conn: &Connection, challenge_id: &str) -> CredenceResult<BTreeMap<String, Vote>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, voter_id, reputation, choice, confidence, cast_at
             FROM votes WHERE challenge_id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([challenge_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut votes = BTreeMap::new();
    for (id, voter_id, reputation, choice, confidence, cast_at) in rows {
        votes.insert(
            voter_id.clone(),
            Vote {
                id,
                challenge_id: challenge_id.to_string(),
                voter_id,
                reputation,
                choice: parse_choice(&choice)?,
                confidence,
                cast_at: parse_time("votes", &cast_at)?,
            },
        );
    }
    Ok(votes)
}

fn hydrate(conn: &Connection, r: ChallengeRow) -> CredenceResult<Challenge> {
    let state = ChallengeState::parse(&r.state)
        .ok_or_else(|| corrupt("challenges", format!("unknown state '{}'", r.state)))?;
    let outcome = r
        .outcome
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| corrupt("challenges", e.to_string()))?;
    Ok(Challenge {
        votes: load_votes(conn, &r.id)?,
        assertion_id: r.assertion_id,
        topic: r.topic,
        raised_by: r.raised_by,
        reason: r.reason,
        created_at: parse_time("challenges", &r.created_at)?,
        deadline: parse_time("challenges", &r.deadline)?,
        state,
        version: r.version as u64,
        outcome,
        id: r.id,
    })
}

fn upsert_votes(conn: &Connection, challenge: &Challenge) -> CredenceResult<()> {
    for vote in challenge.votes.values() {
        conn.execute(
            "INSERT INTO votes (id, challenge_id, voter_id, reputation, choice, confidence, cast_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (challenge_id, voter_id) DO UPDATE SET
                id = excluded.id,
                reputation = excluded.reputation,
                choice = excluded.choice,
                confidence = excluded.confidence,
                cast_at = excluded.cast_at",
            params![
                vote.id,
                challenge.id,
                vote.voter_id,
                vote.reputation,
                choice_str(vote.choice),
                vote.confidence,
                vote.cast_at.to_rfc3339(),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

fn outcome_json(challenge: &Challenge) -> CredenceResult<Option<String>> {
    Ok(challenge.outcome.as_ref().map(serde_json::to_string).transpose()?)
}

pub fn insert_challenge(conn: &Connection, c: &Challenge) -> CredenceResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("insert_challenge begin: {e}")))?;
    tx.execute(
        "INSERT INTO challenges (id, assertion_id, topic, raised_by, reason, created_at, deadline, state, version, outcome)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            c.id,
            c.assertion_id,
            c.topic,
            c.raised_by,
            c.reason,
            c.created_at.to_rfc3339(),
            c.deadline.to_rfc3339(),
            c.state.as_str(),
            c.version as i64,
            outcome_json(c)?,
        ],
    )
    .map_err(|e| map_write_err(format!("challenge:{}", c.id), e))?;
    upsert_votes(&tx, c)?;
    tx.commit()
        .map_err(|e| to_storage_err(format!("insert_challenge commit: {e}")))?;
    Ok(())
}

pub fn get_challenge(conn: &Connection, id: &str) -> CredenceResult<Option<Challenge>> {
    let row = conn
        .query_row(
            &format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE id = ?1"),
            [id],
            read_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.map(|r| hydrate(conn, r)).transpose()
}

/// Versioned save of state, outcome, and votes.
pub fn save_challenge(conn: &Connection, c: &Challenge, expected_version: u64) -> CredenceResult<u64> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("save_challenge begin: {e}")))?;
    let changed = tx
        .execute(
            "UPDATE challenges SET state = ?1, outcome = ?2, version = version + 1
             WHERE id = ?3 AND version = ?4",
            params![c.state.as_str(), outcome_json(c)?, c.id, expected_version as i64],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if changed == 0 {
        let actual: Option<i64> = tx
            .query_row("SELECT version FROM challenges WHERE id = ?1", [&c.id], |row| row.get(0))
            .optional()
            .map_err(|e| to_storage_err(e.to_string()))?;
        let _ = tx.rollback();
        return Err(match actual {
            None => CredenceError::ChallengeNotFound { id: c.id.clone() },
            Some(v) => CredenceError::version_conflict(format!("challenge:{}", c.id), expected_version, v as u64),
        });
    }

    if let Err(e) = upsert_votes(&tx, c) {
        let _ = tx.rollback();
        return Err(e);
    }
    tx.commit()
        .map_err(|e| to_storage_err(format!("save_challenge commit: {e}")))?;
    Ok(expected_version + 1)
}

fn query_challenges(conn: &Connection, sql: &str, arg: Option<&str>) -> CredenceResult<Vec<Challenge>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = match arg {
        Some(a) => stmt.query_map([a], read_row),
        None => stmt.query_map([], read_row),
    }
    .map_err(|e| to_storage_err(e.to_string()))?
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().map(|r| hydrate(conn, r)).collect()
}

pub fn challenges_for(conn: &Connection, assertion_id: &str) -> CredenceResult<Vec<Challenge>> {
    query_challenges(
        conn,
        &format!("SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE assertion_id = ?1 ORDER BY created_at, id"),
        Some(assertion_id),
    )
}

pub fn open_challenges(conn: &Connection) -> CredenceResult<Vec<Challenge>> {
    query_challenges(
        conn,
        &format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges WHERE state IN ('open', 'voting') ORDER BY deadline, id"
        ),
        None,
    )
}
