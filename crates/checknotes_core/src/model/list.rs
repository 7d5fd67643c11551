//! List and item domain model.
//!
//! # Responsibility
//! - Define the records exchanged between the store and its callers.
//! - Provide creation-time validation for the presentation layer.
//!
//! # Invariants
//! - `kind` is fixed at creation; `note_text` is meaningful only for
//!   `ListKind::Text`, `items` only for `ListKind::Checklist`.
//! - `deleted_at = None` means the list is live.
//! - Timestamps are Unix epoch milliseconds (UTC). Legacy files may hold
//!   missing or unreadable values; those surface as `None`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable list identifier, assigned by storage and never reused.
pub type ListId = i64;

/// Stable checklist item identifier.
pub type ItemId = i64;

/// Card color used when the caller does not choose one.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Colors offered by the creation dialog. Any other value is accepted too.
pub const COLOR_PALETTE: [&str; 9] = [
    "#ffffff", "#fff7cc", "#e7f5ff", "#ffe7f0", "#e8ffe7", "#fde68a", "#bfdbfe", "#fecaca",
    "#bbf7d0",
];

/// What a list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Checkbox items stored in the `items` table.
    Checklist,
    /// Freeform body stored in `note_text`.
    Text,
}

impl ListKind {
    /// Storage representation of this kind.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Checklist => "checklist",
            Self::Text => "text",
        }
    }

    /// Parses the storage representation; `None` for unknown values.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "checklist" => Some(Self::Checklist),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Caller-side precondition violations for list creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValidationError {
    EmptyTitle,
    /// A checklist was submitted without a single non-blank item.
    EmptyChecklist,
    /// Item text is empty or whitespace only.
    EmptyItemText,
}

impl Display for ListValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "list title must not be empty"),
            Self::EmptyChecklist => write!(f, "checklist needs at least one item"),
            Self::EmptyItemText => write!(f, "item text must not be empty"),
        }
    }
}

impl Error for ListValidationError {}

/// Input for creating one list.
///
/// The repository stores this as given; call [`NewList::validate`] (or go
/// through `ListService`) to enforce non-empty content first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewList {
    pub title: String,
    pub kind: ListKind,
    /// Initial items in insertion order. Ignored for `ListKind::Text`.
    pub items: Vec<String>,
    /// Body text. Ignored for `ListKind::Checklist`.
    pub note_text: Option<String>,
    pub color: String,
    pub pinned: bool,
}

impl NewList {
    /// Creates an unpinned checklist with the default color.
    pub fn checklist<I, S>(title: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            kind: ListKind::Checklist,
            items: items.into_iter().map(Into::into).collect(),
            note_text: None,
            color: DEFAULT_COLOR.to_string(),
            pinned: false,
        }
    }

    /// Creates an unpinned text note with the default color.
    pub fn text_note(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: ListKind::Text,
            items: Vec::new(),
            note_text: Some(body.into()),
            color: DEFAULT_COLOR.to_string(),
            pinned: false,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Checks the preconditions the creation dialog enforces.
    ///
    /// # Errors
    /// - `EmptyTitle` when the title is blank.
    /// - `EmptyChecklist` when a checklist has no items.
    /// - `EmptyItemText` when any checklist item is blank.
    pub fn validate(&self) -> Result<(), ListValidationError> {
        if self.title.trim().is_empty() {
            return Err(ListValidationError::EmptyTitle);
        }
        if self.kind == ListKind::Checklist {
            if self.items.is_empty() {
                return Err(ListValidationError::EmptyChecklist);
            }
            if self.items.iter().any(|item| item.trim().is_empty()) {
                return Err(ListValidationError::EmptyItemText);
            }
        }
        Ok(())
    }
}

/// One list row plus its derived item counts, as shown in overviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: ListId,
    pub title: String,
    pub kind: ListKind,
    pub note_text: Option<String>,
    pub color: String,
    pub pinned: bool,
    pub archived: bool,
    pub deleted_at: Option<i64>,
    /// `None` for legacy rows whose stored creation time is NULL or
    /// unparsable.
    pub created_at: Option<i64>,
    /// Absent only on rows that predate the column and were never touched.
    pub updated_at: Option<i64>,
    pub item_count: u32,
    pub done_count: u32,
}

impl ListSummary {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Timestamp the overview sorts by.
    pub fn last_modified(&self) -> Option<i64> {
        self.updated_at.or(self.created_at)
    }
}

/// A single checkbox entry of a checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ItemId,
    pub list_id: ListId,
    pub text: String,
    pub checked: bool,
}

#[cfg(test)]
mod tests {
    use super::{ListKind, ListValidationError, NewList, COLOR_PALETTE, DEFAULT_COLOR};

    #[test]
    fn kind_round_trips_through_storage_text() {
        for kind in [ListKind::Checklist, ListKind::Text] {
            assert_eq!(ListKind::from_db_str(kind.as_db_str()), Some(kind));
        }
        assert_eq!(ListKind::from_db_str("board"), None);
    }

    #[test]
    fn validate_rejects_blank_title() {
        let list = NewList::checklist("   ", ["Milk"]);
        assert_eq!(list.validate(), Err(ListValidationError::EmptyTitle));
    }

    #[test]
    fn validate_rejects_checklist_without_items() {
        let list = NewList::checklist("Shopping", Vec::<String>::new());
        assert_eq!(list.validate(), Err(ListValidationError::EmptyChecklist));

        let blank_item = NewList::checklist("Shopping", ["Milk", " "]);
        assert_eq!(blank_item.validate(), Err(ListValidationError::EmptyItemText));
    }

    #[test]
    fn text_note_may_have_empty_body() {
        let note = NewList::text_note("Ideas", "");
        assert!(note.validate().is_ok());
        assert!(note.items.is_empty());
    }

    #[test]
    fn default_color_leads_the_palette() {
        assert_eq!(COLOR_PALETTE[0], DEFAULT_COLOR);
        assert_eq!(NewList::text_note("a", "b").color, DEFAULT_COLOR);
    }
}
