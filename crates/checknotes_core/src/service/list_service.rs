//! List use-case service.
//!
//! # Responsibility
//! - Provide the data-access contract the presentation layer calls.
//! - Normalize raw dialog input into a `NewList` and validate it before
//!   the repositories are involved.
//!
//! # Invariants
//! - Invalid creations never reach storage.
//! - Not-found results surface as `ListNotFound` / `ItemNotFound`.
//! - Log lines carry ids and counts only, never user text.

use crate::model::list::{
    ChecklistItem, ItemId, ListId, ListKind, ListSummary, ListValidationError, NewList,
    DEFAULT_COLOR,
};
use crate::repo::item_repo::ItemRepository;
use crate::repo::list_repo::ListRepository;
use crate::repo::RepoError;
use crate::search::list_query::ListQuery;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for list use-cases.
#[derive(Debug)]
pub enum ListServiceError {
    /// Caller input violates a creation precondition.
    Invalid(ListValidationError),
    ListNotFound(ListId),
    ItemNotFound(ItemId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::ListNotFound(id) => write!(f, "list not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ListServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ListNotFound(id) => Self::ListNotFound(id),
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ListValidationError> for ListServiceError {
    fn from(value: ListValidationError) -> Self {
        Self::Invalid(value)
    }
}

pub type ServiceResult<T> = Result<T, ListServiceError>;

/// Raw input of the "new list / note" dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDraft {
    pub title: String,
    /// One item per line for checklists; the note body for text notes.
    pub body: String,
    /// Empty means [`DEFAULT_COLOR`].
    pub color: String,
    pub kind: ListKind,
}

impl ListDraft {
    /// Trims the title, splits checklist bodies into non-blank lines and
    /// trims text bodies.
    pub fn normalize(&self) -> NewList {
        let title = self.title.trim().to_string();
        let color = match self.color.trim() {
            "" => DEFAULT_COLOR.to_string(),
            other => other.to_string(),
        };
        let body = self.body.trim();

        let list = match self.kind {
            ListKind::Checklist => NewList::checklist(
                title,
                body.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string),
            ),
            ListKind::Text => NewList::text_note(title, body),
        };
        list.with_color(color)
    }
}

/// List service facade over repository implementations.
pub struct ListService<L: ListRepository, I: ItemRepository> {
    lists: L,
    items: I,
}

impl<L: ListRepository, I: ItemRepository> ListService<L, I> {
    /// Creates a service using the provided repository implementations.
    pub fn new(lists: L, items: I) -> Self {
        Self { lists, items }
    }

    /// Validates and creates one list with its initial items.
    pub fn create_list(&self, list: &NewList) -> ServiceResult<ListId> {
        list.validate()?;
        let list_id = self.lists.create_list(list)?;
        info!(
            "event=list_create module=service status=ok list_id={} kind={} items={}",
            list_id,
            list.kind.as_db_str(),
            match list.kind {
                ListKind::Checklist => list.items.len(),
                ListKind::Text => 0,
            }
        );
        Ok(list_id)
    }

    /// Normalizes dialog input, then behaves like [`Self::create_list`].
    pub fn create_from_draft(&self, draft: &ListDraft) -> ServiceResult<ListId> {
        self.create_list(&draft.normalize())
    }

    /// Adds one item; surrounding whitespace is trimmed.
    pub fn add_item(&self, list_id: ListId, text: &str) -> ServiceResult<ItemId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ListValidationError::EmptyItemText.into());
        }
        Ok(self.items.add_item(list_id, text)?)
    }

    pub fn get_items(&self, list_id: ListId) -> ServiceResult<Vec<ChecklistItem>> {
        Ok(self.items.get_items(list_id)?)
    }

    pub fn set_item_checked(&self, item_id: ItemId, checked: bool) -> ServiceResult<()> {
        Ok(self.items.set_item_checked(item_id, checked)?)
    }

    /// Clears all checked items of a list; returns how many were cleared.
    pub fn uncheck_checked_items(&self, list_id: ListId) -> ServiceResult<usize> {
        Ok(self.items.uncheck_checked_items(list_id)?)
    }

    /// Permanently removes items; returns how many were removed.
    pub fn delete_items(&self, item_ids: &[ItemId]) -> ServiceResult<usize> {
        let removed = self.items.delete_items(item_ids)?;
        info!(
            "event=items_delete module=service status=ok requested={} removed={}",
            item_ids.len(),
            removed
        );
        Ok(removed)
    }

    pub fn set_pinned(&self, list_id: ListId, pinned: bool) -> ServiceResult<()> {
        Ok(self.lists.set_pinned(list_id, pinned)?)
    }

    pub fn set_archived(&self, list_id: ListId, archived: bool) -> ServiceResult<()> {
        Ok(self.lists.set_archived(list_id, archived)?)
    }

    pub fn soft_delete(&self, list_id: ListId) -> ServiceResult<()> {
        self.lists.soft_delete(list_id)?;
        info!(
            "event=list_delete module=service status=ok list_id={} mode=soft",
            list_id
        );
        Ok(())
    }

    /// Removes the list and its items for good. Maintenance only.
    pub fn delete_list_permanently(&self, list_id: ListId) -> ServiceResult<()> {
        self.lists.delete_permanently(list_id)?;
        info!(
            "event=list_delete module=service status=ok list_id={} mode=hard",
            list_id
        );
        Ok(())
    }

    /// Gets one list summary, including archived and deleted lists.
    pub fn get_list(&self, list_id: ListId) -> ServiceResult<Option<ListSummary>> {
        Ok(self.lists.get_list(list_id)?)
    }

    /// Overview listing; `query` is matched against titles, item texts and
    /// note bodies when non-blank.
    pub fn get_lists(
        &self,
        include_archived: bool,
        include_deleted: bool,
        query: Option<&str>,
    ) -> ServiceResult<Vec<ListSummary>> {
        let query = ListQuery {
            include_archived,
            include_deleted,
            text: query.map(str::to_string),
        };
        Ok(self.lists.list_summaries(&query)?)
    }
}
