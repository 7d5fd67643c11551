//! Additive schema steps and their executor.
//!
//! # Responsibility
//! - Describe the schema as an ordered list of idempotent steps: base
//!   tables, one step per later column, search indexes.
//! - Decide applicability of each step from the observed schema shape, so
//!   files written by any older release upgrade in place.
//!
//! # Invariants
//! - Steps only create tables/indexes or add columns; nothing is dropped.
//! - One `ensure_schema` run is a single transaction: either every
//!   pending step lands or none does.
//! - The number of known steps is mirrored to `PRAGMA user_version`; the
//!   value is never lowered.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::{Connection, Transaction};

const BASE_TABLES_SQL: &str = include_str!("0001_base.sql");
const SEARCH_INDEXES_SQL: &str = include_str!("0002_search_indexes.sql");

const BASE_LIST_COLUMNS: &[&str] = &["id", "title", "created_at"];
const BASE_ITEM_COLUMNS: &[&str] = &["id", "list_id", "text", "checked"];
const SEARCH_INDEXES: &[&str] = &["idx_lists_title", "idx_lists_note_text", "idx_items_list_text"];

/// One column added after the first release.
#[derive(Debug, Clone, Copy)]
struct ColumnStep {
    table: &'static str,
    column: &'static str,
    definition: &'static str,
    /// Runs only in the same run that adds the column.
    backfill: Option<&'static str>,
}

const COLUMN_STEPS: &[ColumnStep] = &[
    ColumnStep {
        table: "lists",
        column: "updated_at",
        definition: "TIMESTAMP",
        backfill: Some("UPDATE lists SET updated_at = created_at WHERE updated_at IS NULL;"),
    },
    ColumnStep {
        table: "lists",
        column: "pinned",
        definition: "INTEGER NOT NULL DEFAULT 0",
        backfill: None,
    },
    ColumnStep {
        table: "lists",
        column: "archived",
        definition: "INTEGER NOT NULL DEFAULT 0",
        backfill: None,
    },
    ColumnStep {
        table: "lists",
        column: "color",
        definition: "TEXT DEFAULT '#ffffff'",
        backfill: None,
    },
    ColumnStep {
        table: "lists",
        column: "deleted_at",
        definition: "TIMESTAMP",
        backfill: None,
    },
    ColumnStep {
        table: "lists",
        column: "kind",
        definition: "TEXT NOT NULL DEFAULT 'checklist'",
        backfill: None,
    },
    ColumnStep {
        table: "lists",
        column: "note_text",
        definition: "TEXT",
        backfill: None,
    },
];

/// Returns the schema version this binary writes to `PRAGMA user_version`.
///
/// Base tables + one per column step + search indexes.
pub fn latest_version() -> u32 {
    (COLUMN_STEPS.len() + 2) as u32
}

/// Every `(table, column)` pair the store reads or writes.
pub fn required_columns() -> impl Iterator<Item = (&'static str, &'static str)> {
    BASE_LIST_COLUMNS
        .iter()
        .map(|column| ("lists", *column))
        .chain(BASE_ITEM_COLUMNS.iter().map(|column| ("items", *column)))
        .chain(COLUMN_STEPS.iter().map(|step| (step.table, step.column)))
}

/// Brings the schema on `conn` up to date.
///
/// Safe to call on every process start. Returns the number of steps that
/// changed the schema (`0` when it was already current).
///
/// # Errors
/// - [`DbError::Migration`] naming the failed step; the transaction is
///   rolled back and the file is left as it was.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<usize> {
    let recorded = current_user_version(conn)?;
    let latest = latest_version();
    if recorded > latest {
        warn!(
            "event=db_migrate module=db status=newer_schema db_version={} latest_supported={}",
            recorded, latest
        );
    }

    let tx = conn.transaction()?;
    let mut applied = 0;

    if !table_exists(&tx, "lists")? || !table_exists(&tx, "items")? {
        run_step(&tx, "base_tables", BASE_TABLES_SQL)?;
        applied += 1;
    }

    for step in COLUMN_STEPS {
        if table_has_column(&tx, step.table, step.column)? {
            continue;
        }
        let step_name = format!("add_column:{}.{}", step.table, step.column);
        run_step(
            &tx,
            &step_name,
            &format!(
                "ALTER TABLE {} ADD COLUMN {} {};",
                step.table, step.column, step.definition
            ),
        )?;
        if let Some(backfill) = step.backfill {
            run_step(&tx, &step_name, backfill)?;
        }
        info!("event=db_migrate module=db status=ok step={}", step_name);
        applied += 1;
    }

    let mut indexes_missing = false;
    for index in SEARCH_INDEXES {
        if !index_exists(&tx, index)? {
            indexes_missing = true;
            break;
        }
    }
    if indexes_missing {
        run_step(&tx, "search_indexes", SEARCH_INDEXES_SQL)?;
        applied += 1;
    }

    if recorded < latest {
        tx.execute_batch(&format!("PRAGMA user_version = {latest};"))?;
    }
    tx.commit()?;

    if applied > 0 {
        info!(
            "event=db_migrate module=db status=ok applied_steps={} from_version={} to_version={}",
            applied,
            recorded,
            recorded.max(latest)
        );
    }
    Ok(applied)
}

fn run_step(tx: &Transaction<'_>, step: &str, sql: &str) -> DbResult<()> {
    tx.execute_batch(sql).map_err(|source| DbError::Migration {
        step: step.to_string(),
        source,
    })
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    schema_object_exists(conn, "table", table)
}

fn index_exists(conn: &Connection, index: &str) -> rusqlite::Result<bool> {
    schema_object_exists(conn, "index", index)
}

fn schema_object_exists(conn: &Connection, kind: &str, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = ?1 AND name = ?2
        );",
        [kind, name],
        |row| row.get(0),
    )
}

pub(crate) fn table_has_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
