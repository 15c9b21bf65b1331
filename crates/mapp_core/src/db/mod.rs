//! SQLite storage bootstrap and table creation entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the local backend.
//! - Create the record table through versioned, idempotent migrations.
//! - Own the process-wide shared store handle.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Opening a connection never creates tables; table creation is explicit.

use std::path::PathBuf;
use thiserror::Error;

pub mod migrations;
mod open;
mod store;

pub use open::{open_db, open_db_in_memory, open_location};
pub use store::{SharedConnection, SharedStore};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare store directory `{}`: {source}", path.display())]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("store handle lock poisoned")]
    Poisoned,
}
