//! SQLite-backed store.

use std::path::Path;

use tracing::info;

use credence_core::errors::CredenceResult;
use credence_core::models::{Assertion, Challenge, Evidence, PromotionEvent};
use credence_core::traits::{IAssertionStore, IChallengeStore, IEvidenceStore, IPromotionLedger};
use credence_core::weight::Weight;

use crate::migrations;
use crate::pool::{pragmas, SharedConnection};
use crate::queries::{assertion_ops, challenge_ops, evidence_ops, ledger_ops};

pub struct SqliteStore {
    conn: SharedConnection,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: &Path) -> CredenceResult<Self> {
        let store = Self {
            conn: SharedConnection::open(path)?,
        };
        store.migrate()?;
        info!(path = %path.display(), "sqlite store opened");
        Ok(store)
    }

    /// Private in-memory database, for tests.
    pub fn open_in_memory() -> CredenceResult<Self> {
        let store = Self {
            conn: SharedConnection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> CredenceResult<usize> {
        self.conn.with_conn(migrations::run_migrations)
    }

    pub fn schema_version(&self) -> CredenceResult<u32> {
        self.conn.with_conn(migrations::current_version)
    }

    pub fn is_wal(&self) -> CredenceResult<bool> {
        self.conn.with_conn(pragmas::verify_wal_mode)
    }
}

impl IAssertionStore for SqliteStore {
    fn insert_assertion(&self, assertion: &Assertion) -> CredenceResult<()> {
        self.conn.with_conn(|c| assertion_ops::insert_assertion(c, assertion))
    }

    fn get_assertion(&self, id: &str) -> CredenceResult<Option<Assertion>> {
        self.conn.with_conn(|c| assertion_ops::get_assertion(c, id))
    }

    fn update_weight(&self, id: &str, weight: Weight, expected_version: u64) -> CredenceResult<u64> {
        self.conn
            .with_conn(|c| assertion_ops::update_weight(c, id, weight, expected_version))
    }

    fn freeze(&self, id: &str, event: &PromotionEvent) -> CredenceResult<bool> {
        self.conn.with_conn(|c| assertion_ops::freeze(c, id, event))
    }

    fn assertion_ids(&self) -> CredenceResult<Vec<String>> {
        self.conn.with_conn(assertion_ops::assertion_ids)
    }
}

impl IEvidenceStore for SqliteStore {
    fn insert_evidence(&self, evidence: &Evidence) -> CredenceResult<()> {
        self.conn.with_conn(|c| evidence_ops::insert_evidence(c, evidence))
    }

    fn get_evidence(&self, id: &str) -> CredenceResult<Option<Evidence>> {
        self.conn.with_conn(|c| evidence_ops::get_evidence(c, id))
    }

    fn evidence_for(&self, assertion_id: &str) -> CredenceResult<Vec<Evidence>> {
        self.conn.with_conn(|c| evidence_ops::evidence_for(c, assertion_id))
    }
}

impl IChallengeStore for SqliteStore {
    fn insert_challenge(&self, challenge: &Challenge) -> CredenceResult<()> {
        self.conn.with_conn(|c| challenge_ops::insert_challenge(c, challenge))
    }

    fn get_challenge(&self, id: &str) -> CredenceResult<Option<Challenge>> {
        self.conn.with_conn(|c| challenge_ops::get_challenge(c, id))
    }

    fn save_challenge(&self, challenge: &Challenge, expected_version: u64) -> CredenceResult<u64> {
        self.conn
            .with_conn(|c| challenge_ops::save_challenge(c, challenge, expected_version))
    }

    fn challenges_for(&self, assertion_id: &str) -> CredenceResult<Vec<Challenge>> {
        self.conn.with_conn(|c| challenge_ops::challenges_for(c, assertion_id))
    }

    fn open_challenges(&self) -> CredenceResult<Vec<Challenge>> {
        self.conn.with_conn(challenge_ops::open_challenges)
    }
}

impl IPromotionLedger for SqliteStore {
    fn events_for(&self, assertion_id: &str) -> CredenceResult<Vec<PromotionEvent>> {
        self.conn.with_conn(|c| ledger_ops::events_for(c, assertion_id))
    }

    fn all_events(&self) -> CredenceResult<Vec<PromotionEvent>> {
        self.conn.with_conn(ledger_ops::all_events)
    }
}
