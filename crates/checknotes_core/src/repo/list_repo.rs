//! List repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create lists (with their initial items) atomically.
//! - Flip pin/archive flags and soft-delete lists.
//! - Expose summary reads backed by the search/aggregation query.
//!
//! # Invariants
//! - Flag writes and the `updated_at` touch happen in one statement.
//! - `soft_delete` records the first deletion time and leaves
//!   `updated_at` alone.
//! - Soft-deleted lists reject every mutation except repeated soft delete.

use crate::model::list::{ListId, ListKind, ListSummary, NewList};
use crate::repo::{
    bool_to_int, ensure_connection_ready, RepoError, RepoResult, NOW_SQL, TOUCH_SET_SQL,
};
use crate::search::list_query::{load_list_summary, query_lists, ListQuery};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Repository interface for list-level operations.
pub trait ListRepository {
    /// Inserts the list and, for checklists, its items in input order.
    fn create_list(&self, list: &NewList) -> RepoResult<ListId>;
    /// Loads one summary, including archived and soft-deleted lists.
    fn get_list(&self, list_id: ListId) -> RepoResult<Option<ListSummary>>;
    /// Runs the filtered, searched and ordered overview query.
    fn list_summaries(&self, query: &ListQuery) -> RepoResult<Vec<ListSummary>>;
    fn set_pinned(&self, list_id: ListId, pinned: bool) -> RepoResult<()>;
    fn set_archived(&self, list_id: ListId, archived: bool) -> RepoResult<()>;
    /// Marks the list deleted. Repeated calls keep the first timestamp.
    fn soft_delete(&self, list_id: ListId) -> RepoResult<()>;
    /// Removes the list row; its items go with it via the foreign key.
    ///
    /// Not part of the presentation contract.
    fn delete_permanently(&self, list_id: ListId) -> RepoResult<()>;
}

/// SQLite-backed list repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteListRepository<'conn> {
    /// Constructs a repository from a connection with the current schema.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when
    ///   `ensure_schema` has not run on `conn`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips the schema check for connections opened through `open_db`.
    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn set_flag(&self, list_id: ListId, column: &str, value: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE lists
                 SET {column} = ?1, {TOUCH_SET_SQL}
                 WHERE id = ?2
                   AND deleted_at IS NULL;"
            ),
            params![bool_to_int(value), list_id],
        )?;

        if changed == 0 {
            return Err(RepoError::ListNotFound(list_id));
        }

        Ok(())
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, list: &NewList) -> RepoResult<ListId> {
        let note_text = match list.kind {
            ListKind::Text => list.note_text.as_deref(),
            ListKind::Checklist => None,
        };

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            &format!(
                "INSERT INTO lists (
                    title,
                    color,
                    pinned,
                    archived,
                    kind,
                    note_text,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, 0, ?4, ?5, {NOW_SQL}, {NOW_SQL});"
            ),
            params![
                list.title.as_str(),
                list.color.as_str(),
                bool_to_int(list.pinned),
                list.kind.as_db_str(),
                note_text,
            ],
        )?;
        let list_id = tx.last_insert_rowid();

        if list.kind == ListKind::Checklist {
            let mut insert_item =
                tx.prepare("INSERT INTO items (list_id, text, checked) VALUES (?1, ?2, 0);")?;
            for text in &list.items {
                insert_item.execute(params![list_id, text.as_str()])?;
            }
        }

        tx.commit()?;
        Ok(list_id)
    }

    fn get_list(&self, list_id: ListId) -> RepoResult<Option<ListSummary>> {
        load_list_summary(self.conn, list_id)
    }

    fn list_summaries(&self, query: &ListQuery) -> RepoResult<Vec<ListSummary>> {
        query_lists(self.conn, query)
    }

    fn set_pinned(&self, list_id: ListId, pinned: bool) -> RepoResult<()> {
        self.set_flag(list_id, "pinned", pinned)
    }

    fn set_archived(&self, list_id: ListId, archived: bool) -> RepoResult<()> {
        self.set_flag(list_id, "archived", archived)
    }

    fn soft_delete(&self, list_id: ListId) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE lists
                 SET deleted_at = COALESCE(deleted_at, {NOW_SQL})
                 WHERE id = ?1;"
            ),
            [list_id],
        )?;

        if changed == 0 {
            return Err(RepoError::ListNotFound(list_id));
        }

        Ok(())
    }

    fn delete_permanently(&self, list_id: ListId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM lists WHERE id = ?1;", [list_id])?;

        if changed == 0 {
            return Err(RepoError::ListNotFound(list_id));
        }

        Ok(())
    }
}

/// Returns the kind of a live (not soft-deleted) list, or `None`.
pub(crate) fn live_list_kind(conn: &Connection, list_id: ListId) -> RepoResult<Option<ListKind>> {
    let kind_text: Option<String> = conn
        .query_row(
            "SELECT kind FROM lists WHERE id = ?1 AND deleted_at IS NULL;",
            [list_id],
            |row| row.get(0),
        )
        .optional()?;

    match kind_text {
        Some(text) => ListKind::from_db_str(&text).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid list kind `{text}` in lists.kind"))
        }),
        None => Ok(None),
    }
}

/// Refreshes `updated_at` of one list.
pub(crate) fn touch_list(conn: &Connection, list_id: ListId) -> RepoResult<()> {
    conn.execute(
        &format!("UPDATE lists SET {TOUCH_SET_SQL} WHERE id = ?1;"),
        [list_id],
    )?;
    Ok(())
}
