//! Checklist item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Add, read, toggle and hard-delete checklist items.
//! - Keep the owning list's `updated_at` in step with item changes.
//!
//! # Invariants
//! - Every write runs in one immediate transaction together with the
//!   parent touch; partial effects are never observable.
//! - Items of soft-deleted lists are read-only.
//! - `get_items` returns items in insertion (id) order.

use crate::model::list::{ChecklistItem, ItemId, ListId, ListKind};
use crate::repo::list_repo::{live_list_kind, touch_list};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_flag, RepoError, RepoResult, TOUCH_SET_SQL,
};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};

/// Repository interface for checklist items.
pub trait ItemRepository {
    /// Appends one unchecked item to a live checklist.
    fn add_item(&self, list_id: ListId, text: &str) -> RepoResult<ItemId>;
    /// Snapshot of all items of the list, oldest first.
    fn get_items(&self, list_id: ListId) -> RepoResult<Vec<ChecklistItem>>;
    fn set_item_checked(&self, item_id: ItemId, checked: bool) -> RepoResult<()>;
    /// Clears every checked item of the list; returns how many changed.
    ///
    /// The list is touched once even when nothing was checked.
    fn uncheck_checked_items(&self, list_id: ListId) -> RepoResult<usize>;
    /// Hard-deletes the given items; returns how many rows were removed.
    ///
    /// Unknown ids and items of soft-deleted lists are skipped.
    fn delete_items(&self, item_ids: &[ItemId]) -> RepoResult<usize>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a connection with the current schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips the schema check for connections opened through `open_db`.
    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn add_item(&self, list_id: ListId, text: &str) -> RepoResult<ItemId> {
        let tx = self.begin()?;
        match live_list_kind(&tx, list_id)? {
            Some(ListKind::Checklist) => {}
            Some(ListKind::Text) => return Err(RepoError::NotAChecklist(list_id)),
            None => return Err(RepoError::ListNotFound(list_id)),
        }

        tx.execute(
            "INSERT INTO items (list_id, text, checked) VALUES (?1, ?2, 0);",
            params![list_id, text],
        )?;
        let item_id = tx.last_insert_rowid();
        touch_list(&tx, list_id)?;
        tx.commit()?;

        Ok(item_id)
    }

    fn get_items(&self, list_id: ListId) -> RepoResult<Vec<ChecklistItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                list_id,
                text,
                checked
             FROM items
             WHERE list_id = ?1
             ORDER BY id ASC;",
        )?;

        let mut rows = stmt.query([list_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn set_item_checked(&self, item_id: ItemId, checked: bool) -> RepoResult<()> {
        let tx = self.begin()?;
        let list_id: Option<ListId> = tx
            .query_row(
                "SELECT i.list_id
                 FROM items i
                 INNER JOIN lists l ON l.id = i.list_id
                 WHERE i.id = ?1
                   AND l.deleted_at IS NULL;",
                [item_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(list_id) = list_id else {
            return Err(RepoError::ItemNotFound(item_id));
        };

        tx.execute(
            "UPDATE items SET checked = ?1 WHERE id = ?2;",
            params![bool_to_int(checked), item_id],
        )?;
        touch_list(&tx, list_id)?;
        tx.commit()?;

        Ok(())
    }

    fn uncheck_checked_items(&self, list_id: ListId) -> RepoResult<usize> {
        let tx = self.begin()?;
        if live_list_kind(&tx, list_id)?.is_none() {
            return Err(RepoError::ListNotFound(list_id));
        }

        let cleared = tx.execute(
            "UPDATE items SET checked = 0 WHERE list_id = ?1 AND checked = 1;",
            [list_id],
        )?;
        touch_list(&tx, list_id)?;
        tx.commit()?;

        Ok(cleared)
    }

    fn delete_items(&self, item_ids: &[ItemId]) -> RepoResult<usize> {
        if item_ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; item_ids.len()].join(", ");
        let tx = self.begin()?;

        // Touch first: the parent lookup needs the rows still present.
        tx.execute(
            &format!(
                "UPDATE lists
                 SET {TOUCH_SET_SQL}
                 WHERE deleted_at IS NULL
                   AND id IN (SELECT DISTINCT list_id FROM items WHERE id IN ({placeholders}));"
            ),
            params_from_iter(item_ids.iter()),
        )?;
        let removed = tx.execute(
            &format!(
                "DELETE FROM items
                 WHERE id IN ({placeholders})
                   AND list_id IN (SELECT id FROM lists WHERE deleted_at IS NULL);"
            ),
            params_from_iter(item_ids.iter()),
        )?;
        tx.commit()?;

        Ok(removed)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ChecklistItem> {
    Ok(ChecklistItem {
        id: row.get("id")?,
        list_id: row.get("list_id")?,
        text: row.get("text")?,
        checked: parse_flag(row.get("checked")?, "items.checked")?,
    })
}
