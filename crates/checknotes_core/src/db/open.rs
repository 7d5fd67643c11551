//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure pragmas and SQL functions the store relies on.
//! - Run `ensure_schema` before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` (cascade delete of items).
//! - Returned connections expose the `casefold(text)` SQL function.
//! - Returned connections have every schema step applied.

use super::migrations::ensure_schema;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if absent) a SQLite database file and brings its
/// schema up to date.
///
/// The parent directory is created when missing.
///
/// # Errors
/// - [`DbError::StorageUnavailable`] when the directory or file cannot be
///   created/opened.
/// - [`DbError::Migration`] when a schema step fails.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let opened = create_parent_dir(path).and_then(|()| {
        Connection::open(path).map_err(|err| DbError::storage_unavailable(path, err))
    });
    finish_open("file", path, started_at, opened)
}

/// Opens an in-memory SQLite database with the current schema.
///
/// Used by tests and by callers that want a throwaway store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let opened = Connection::open_in_memory()
        .map_err(|err| DbError::storage_unavailable(":memory:", err));
    finish_open("memory", Path::new(":memory:"), started_at, opened)
}

fn finish_open(
    mode: &str,
    location: &Path,
    started_at: Instant,
    opened: DbResult<Connection>,
) -> DbResult<Connection> {
    let mut conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(applied) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={} applied_steps={}",
                mode,
                started_at.elapsed().as_millis(),
                applied
            );
            Ok(conn)
        }
        Err(err) => {
            let err = as_storage_failure(location, err);
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// `Connection::open` is lazy: a corrupt, foreign or unwritable file is
/// only detected by the first statement of the bootstrap.
fn as_storage_failure(location: &Path, err: DbError) -> DbError {
    match err {
        DbError::Sqlite(source) | DbError::Migration { source, .. }
            if is_storage_failure(&source) =>
        {
            DbError::storage_unavailable(location, source)
        }
        other => other,
    }
}

fn is_storage_failure(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.code,
                ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::CannotOpen
                    | ErrorCode::ReadOnly
            )
    )
}

fn create_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| DbError::storage_unavailable(parent, err)),
        _ => Ok(()),
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<usize> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    register_casefold(conn)?;
    ensure_schema(conn)
}

/// Registers `casefold(text)`: Unicode lowercasing for search matching.
///
/// SQLite's built-in `LOWER()` only folds ASCII, which would make
/// non-Latin titles case-sensitive. NULL input yields NULL.
fn register_casefold(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )?;
    Ok(())
}
