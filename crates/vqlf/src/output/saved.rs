//! Saved filter output formatting.

use serde::Serialize;
use serde_json::Value;
use vql_filter::filter::to_vql;
use vql_filter::store::SavedFilters;
use vql_filter::tree::FilterTree;

use super::helpers::{dim, truncate_str};

/// Widest name column of the list table.
const NAME_WIDTH: usize = 24;

/// JSON output structure for saved filters list command.
#[derive(Serialize)]
pub struct SavedListOutput<'a> {
    pub filters: Vec<SavedFilterOutput<'a>>,
}

/// JSON output structure for a single saved filter.
#[derive(Serialize)]
pub struct SavedFilterOutput<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vql: Option<String>,
    pub mapping: Option<&'a Value>,
}

/// Formats saved filters as JSON.
///
/// A stored mapping that no longer reads back keeps `vql` absent.
pub fn format_saved_json(saved: &SavedFilters) -> Result<String, serde_json::Error> {
    let filters = saved
        .names()
        .map(|name| SavedFilterOutput {
            name,
            vql: saved.get(name).ok().flatten().map(|tree| to_vql(&tree)),
            mapping: saved.mapping(name),
        })
        .collect();
    serde_json::to_string_pretty(&SavedListOutput { filters })
}

/// Formats saved filters as a table.
pub fn format_saved_table(saved: &SavedFilters, use_colors: bool) -> String {
    if saved.is_empty() {
        return "No saved filters.\n".to_string();
    }

    let mut output = String::new();
    let header = format!("{:<NAME_WIDTH$} {}", "Name", "Filter");
    output.push_str(&dim(&header, use_colors));
    output.push('\n');

    for name in saved.names() {
        let text = match saved.get(name) {
            Ok(Some(tree)) if tree.is_empty() => dim("(empty)", use_colors),
            Ok(Some(tree)) => truncate_str(&to_vql(&tree), 60),
            Ok(None) | Err(_) => dim("(invalid mapping)", use_colors),
        };
        let line = format!("{:<NAME_WIDTH$} {}", truncate_str(name, NAME_WIDTH), text);
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Formats the confirmation of a save.
pub fn format_saved_filter(name: &str, tree: &FilterTree, replaced: bool) -> String {
    let verb = if replaced { "Updated" } else { "Saved" };
    format!("{verb} filter '{name}': {}\n", to_vql(tree))
}

/// Formats the confirmation of a delete.
pub fn format_deleted_filter(name: &str) -> String {
    format!("Deleted filter '{name}'\n")
}
