//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for lists and items.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories only operate on connections that passed `ensure_schema`
//!   (checked by `try_new`).
//! - Every write that changes a list or one of its items touches the
//!   list's `updated_at` inside the same transaction or statement.
//! - Missing targets are reported as `ListNotFound` / `ItemNotFound`,
//!   never silently ignored.

use crate::db::migrations::{required_columns, table_exists, table_has_column};
use crate::db::DbError;
use crate::model::list::{ItemId, ListId};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item_repo;
pub mod list_repo;

/// Current UTC time in the storage text format (millisecond resolution).
macro_rules! now_sql {
    () => {
        "strftime('%Y-%m-%d %H:%M:%f', 'now')"
    };
}

pub(crate) const NOW_SQL: &str = now_sql!();

/// `SET` fragment refreshing `lists.updated_at` without ever moving it
/// backwards, even if the wall clock does.
pub(crate) const TOUCH_SET_SQL: &str = concat!(
    "updated_at = MAX(COALESCE(updated_at, created_at, ''), ",
    now_sql!(),
    ")"
);

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for list/item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// List id is unknown, or the list is soft-deleted and the operation
    /// would mutate it.
    ListNotFound(ListId),
    /// Item id is unknown, or its list is soft-deleted.
    ItemNotFound(ItemId),
    /// Items can only be added to checklist-kind lists.
    NotAChecklist(ListId),
    /// Persisted row cannot be mapped onto the model.
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ListNotFound(_) | Self::ItemNotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::NotAChecklist(id) => write!(f, "list {id} is a text note, not a checklist"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "connection is missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Verifies that `conn` carries the full current schema.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["lists", "items"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    for (table, column) in required_columns() {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

/// Maps a stored 0/1 flag, rejecting anything else.
pub(crate) fn parse_flag(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
