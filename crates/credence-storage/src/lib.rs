//! # credence-storage
//!
//! Two implementations of every store trait:
//! - [`MemoryStore`]: DashMap-backed, for tests and embedding.
//! - [`SqliteStore`]: rusqlite with WAL, versioned migrations, and a
//!   single-transaction freeze.

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use credence_core::errors::{CredenceError, StorageError};

/// Wrap a backend message as a storage error.
pub(crate) fn to_storage_err(msg: impl Into<String>) -> CredenceError {
    CredenceError::StorageError(StorageError::SqliteError { message: msg.into() })
}

pub(crate) fn corrupt(table: &str, details: impl Into<String>) -> CredenceError {
    CredenceError::StorageError(StorageError::CorruptRow {
        table: table.to_string(),
        details: details.into(),
    })
}
