//! Domain model for checklists and text notes.
//!
//! # Responsibility
//! - Define the data structures shared by the store, service and callers.
//!
//! # Invariants
//! - Every list is identified by a stable integer `ListId`.
//! - Lists are soft-deleted via a timestamp; items are hard-deleted.

pub mod list;
