//! Output formatting utilities for the vqlf CLI.
//!
//! Every formatter returns a `String` (text) or a pretty JSON string; the
//! command handlers decide where it goes.
//!
//! - [`tree`] - Filter tree output (parse, saved show)
//! - [`predicate`] - Predicate and statement output (sql, select)
//! - [`saved`] - Saved filter output (list, save, delete)
//! - [`helpers`] - Common formatting utilities

pub mod helpers;
mod predicate;
mod saved;
mod tree;

// Trees
pub use tree::{format_tree_json, format_tree_table};

// Predicates
pub use predicate::{
    format_predicate_json, format_predicate_table, format_select_json, format_select_table,
};

// Saved filters
pub use saved::{
    format_deleted_filter, format_saved_filter, format_saved_json, format_saved_table,
};
