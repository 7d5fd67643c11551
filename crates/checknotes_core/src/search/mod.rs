//! List search and aggregation entry points.
//!
//! # Responsibility
//! - Expose the overview query (filters, substring search, item counts).
//! - Keep result shaping inside core.

pub mod list_query;
