//! One connection behind a std mutex. The store traits are synchronous, so
//! the lock is taken on whatever thread calls in.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use credence_core::errors::{CredenceError, CredenceResult, StorageError};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

pub struct SharedConnection {
    conn: Mutex<Connection>,
}

impl SharedConnection {
    pub fn open(path: &Path) -> CredenceResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> CredenceResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> CredenceResult<T>
    where
        F: FnOnce(&Connection) -> CredenceResult<T>,
    {
        let guard = self.conn.lock().map_err(|_| {
            CredenceError::StorageError(StorageError::LockPoisoned {
                resource: "sqlite_connection".into(),
            })
        })?;
        f(&guard)
    }
}
