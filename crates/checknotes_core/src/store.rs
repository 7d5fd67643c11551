//! Process-wide store handle.
//!
//! # Responsibility
//! - Own the single SQLite connection for the process lifetime.
//! - Hand out repositories and the list service borrowing that connection.
//!
//! # Invariants
//! - A `Store` only exists for a connection whose schema is current.
//! - Operations are synchronous; callers issue them one at a time.

use crate::config;
use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::repo::item_repo::SqliteItemRepository;
use crate::repo::list_repo::SqliteListRepository;
use crate::service::list_service::ListService;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Service type handed out by [`Store::service`].
pub type SqliteListService<'conn> =
    ListService<SqliteListRepository<'conn>, SqliteItemRepository<'conn>>;

/// Explicit store object constructed once at startup and passed to callers.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = open_db(path)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens the database in the per-user application-data directory.
    ///
    /// # Errors
    /// - [`DbError::StorageUnavailable`] when no home directory can be
    ///   resolved or the file cannot be created.
    pub fn open_default() -> DbResult<Self> {
        let path = config::default_db_path().ok_or_else(|| {
            DbError::storage_unavailable(
                config::APP_DIR_NAME,
                "could not resolve the per-user data directory",
            )
        })?;
        Self::open(path)
    }

    /// Opens a throwaway in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
            path: None,
        })
    }

    /// Backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn lists(&self) -> SqliteListRepository<'_> {
        SqliteListRepository::from_ready(&self.conn)
    }

    pub fn items(&self) -> SqliteItemRepository<'_> {
        SqliteItemRepository::from_ready(&self.conn)
    }

    /// The data-access contract used by the presentation layer.
    pub fn service(&self) -> SqliteListService<'_> {
        ListService::new(self.lists(), self.items())
    }
}
