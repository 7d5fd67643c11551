//! Core persistence and query layer for checklists and text notes.
//! This crate is the single source of truth for list/item invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_default_logging, init_logging, logging_status};
pub use model::list::{
    ChecklistItem, ItemId, ListId, ListKind, ListSummary, ListValidationError, NewList,
    COLOR_PALETTE, DEFAULT_COLOR,
};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::list_repo::{ListRepository, SqliteListRepository};
pub use repo::{RepoError, RepoResult};
pub use search::list_query::{query_lists, ListQuery};
pub use service::list_service::{ListDraft, ListService, ListServiceError, ServiceResult};
pub use store::{SqliteListService, Store};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
