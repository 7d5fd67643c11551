//! Overview query: visibility filter, substring search and item counts.
//!
//! # Responsibility
//! - Return list summaries with `item_count` / `done_count` computed by
//!   correlated subqueries in the same statement.
//! - Match a query against list titles, item texts and note bodies.
//!
//! # Invariants
//! - Matching is case-insensitive via `casefold` on both sides and treats
//!   `%`, `_` and `\` in the query literally.
//! - Ordering is total: pinned first, then last modification descending,
//!   then creation descending, then id descending.

use crate::model::list::{ListId, ListKind, ListSummary};
use crate::repo::{parse_flag, RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

static LIKE_SPECIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\\%_]").expect("valid like-escape regex"));

/// Text timestamps to epoch milliseconds; NULL and unparsable stay NULL.
const SUMMARY_SELECT_SQL: &str = "SELECT
    l.id AS id,
    l.title AS title,
    l.kind AS kind,
    l.note_text AS note_text,
    COALESCE(l.color, '#ffffff') AS color,
    l.pinned AS pinned,
    l.archived AS archived,
    CAST(ROUND((julianday(l.deleted_at) - 2440587.5) * 86400000.0) AS INTEGER) AS deleted_at_ms,
    CAST(ROUND((julianday(l.created_at) - 2440587.5) * 86400000.0) AS INTEGER) AS created_at_ms,
    CAST(ROUND((julianday(l.updated_at) - 2440587.5) * 86400000.0) AS INTEGER) AS updated_at_ms,
    (SELECT COUNT(*) FROM items i WHERE i.list_id = l.id) AS item_count,
    (SELECT COUNT(*) FROM items i WHERE i.list_id = l.id AND i.checked = 1) AS done_count
FROM lists l";

const ORDER_SQL: &str = " ORDER BY
    l.pinned DESC,
    julianday(COALESCE(l.updated_at, l.created_at)) DESC,
    julianday(l.created_at) DESC,
    l.id DESC";

/// Filter and search options for the overview.
///
/// The default shows live, unarchived lists without a search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub include_archived: bool,
    pub include_deleted: bool,
    /// Substring to look for; blank after trimming means no search.
    pub text: Option<String>,
}

impl ListQuery {
    /// Default view narrowed by a search term.
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_archived(mut self, include_archived: bool) -> Self {
        self.include_archived = include_archived;
        self
    }

    pub fn with_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    /// Lowercased, trimmed search needle, if any.
    fn needle(&self) -> Option<String> {
        let trimmed = self.text.as_deref().map(str::trim).unwrap_or("");
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }
}

/// Runs the overview query and returns summaries in display order.
pub fn query_lists(conn: &Connection, query: &ListQuery) -> RepoResult<Vec<ListSummary>> {
    let mut sql = format!("{SUMMARY_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if !query.include_archived {
        sql.push_str(" AND l.archived = 0");
    }
    if !query.include_deleted {
        sql.push_str(" AND l.deleted_at IS NULL");
    }

    if let Some(needle) = query.needle() {
        sql.push_str(
            " AND (
                casefold(l.title) LIKE ?1 ESCAPE '\\'
                OR EXISTS (
                    SELECT 1
                    FROM items it
                    WHERE it.list_id = l.id
                      AND casefold(it.text) LIKE ?1 ESCAPE '\\'
                )
                OR (l.note_text IS NOT NULL AND casefold(l.note_text) LIKE ?1 ESCAPE '\\')
            )",
        );
        bind_values.push(Value::Text(like_pattern(&needle)));
    }

    sql.push_str(ORDER_SQL);

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        summaries.push(parse_summary_row(row)?);
    }

    Ok(summaries)
}

/// Loads one summary regardless of archive/delete state.
pub fn load_list_summary(conn: &Connection, list_id: ListId) -> RepoResult<Option<ListSummary>> {
    let mut stmt = conn.prepare(&format!("{SUMMARY_SELECT_SQL} WHERE l.id = ?1;"))?;
    let mut rows = stmt.query([list_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_summary_row(row)?));
    }

    Ok(None)
}

fn like_pattern(needle: &str) -> String {
    format!("%{}%", LIKE_SPECIAL_RE.replace_all(needle, r"\$0"))
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<ListSummary> {
    let id: ListId = row.get("id")?;

    let kind_text: String = row.get("kind")?;
    let kind = ListKind::from_db_str(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid list kind `{kind_text}` in lists.kind"))
    })?;

    Ok(ListSummary {
        id,
        title: row.get("title")?,
        kind,
        note_text: row.get("note_text")?,
        color: row.get("color")?,
        pinned: parse_flag(row.get("pinned")?, "lists.pinned")?,
        archived: parse_flag(row.get("archived")?, "lists.archived")?,
        deleted_at: row.get("deleted_at_ms")?,
        created_at: row.get("created_at_ms")?,
        updated_at: row.get("updated_at_ms")?,
        item_count: row.get("item_count")?,
        done_count: row.get("done_count")?,
    })
}
