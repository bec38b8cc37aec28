//! Predicate and statement output formatting.

use serde::Serialize;
use vql_filter::predicate::Predicate;

use super::helpers::{dim, header};

/// JSON output structure for the sql command.
#[derive(Serialize)]
pub struct PredicateOutput<'a> {
    pub predicate: &'a str,
    pub fields: Vec<&'a str>,
}

/// Formats a predicate as JSON.
pub fn format_predicate_json(predicate: &Predicate) -> Result<String, serde_json::Error> {
    let output = PredicateOutput {
        predicate: &predicate.text,
        fields: predicate.fields.iter().map(|f| f.as_str()).collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a predicate followed by the fields it references.
pub fn format_predicate_table(predicate: &Predicate, use_colors: bool) -> String {
    if predicate.is_empty() {
        return format!("{}\n", dim("(empty predicate)", use_colors));
    }

    let mut output = String::new();
    output.push_str(&predicate.text);
    output.push_str("\n\n");
    output.push_str(&header("Fields", use_colors));
    output.push('\n');
    for field in &predicate.fields {
        output.push_str(&format!("  {field}\n"));
    }
    output
}

/// JSON output structure for the select command.
#[derive(Serialize)]
pub struct SelectOutput<'a> {
    pub sql: &'a str,
}

/// Formats a SELECT statement as JSON.
pub fn format_select_json(sql: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SelectOutput { sql })
}

/// Formats a SELECT statement with one top-level clause per line.
///
/// Keywords inside parentheses or quotes stay where they are.
pub fn format_select_table(sql: &str) -> String {
    const CLAUSES: [&str; 6] = [
        " FROM ",
        " LEFT JOIN ",
        " INNER JOIN ",
        " WHERE ",
        " ORDER BY ",
        " LIMIT ",
    ];

    let mut output = String::with_capacity(sql.len() + 8);
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (index, c) in sql.char_indices() {
        match (quote, c) {
            (Some(open), _) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ' ') if depth == 0 => {
                let rest = &sql[index..];
                if CLAUSES.iter().any(|clause| rest.starts_with(clause)) {
                    output.push('\n');
                    continue;
                }
            }
            _ => {}
        }
        output.push(c);
    }
    output.push('\n');
    output
}
