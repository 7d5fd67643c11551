//! SQLite storage bootstrap and schema evolution entry points.
//!
//! # Responsibility
//! - Open and configure the single SQLite connection used by the store.
//! - Bring the schema up to date before any list/item query runs.
//!
//! # Invariants
//! - Schema evolution is additive only: columns are added, never dropped
//!   or renamed.
//! - Core code must not read/write application data before
//!   `ensure_schema` succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Engine failure on an already opened connection.
    Sqlite(rusqlite::Error),
    /// Database file or its directory cannot be created or opened.
    StorageUnavailable {
        path: PathBuf,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
    /// One schema step failed; nothing from the run was committed.
    Migration {
        step: String,
        source: rusqlite::Error,
    },
}

impl DbError {
    pub(crate) fn storage_unavailable(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::StorageUnavailable { path, source } => {
                write!(f, "storage unavailable at `{}`: {source}", path.display())
            }
            Self::Migration { step, source } => {
                write!(f, "schema migration step `{step}` failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::StorageUnavailable { source, .. } => Some(source.as_ref()),
            Self::Migration { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
