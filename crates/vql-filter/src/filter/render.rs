//! Rendering filter trees back to VQL text.

use std::fmt;

use crate::tree::{Condition, FilterExpr, FilterTree};
use crate::types::Literal;

/// Renders the enabled part of `tree` as a WHERE-clause expression.
///
/// Nested logic nodes with two or more surviving children are
/// parenthesized; a logic node with a single survivor is unwrapped and an
/// empty one disappears. Text values are always quoted. An empty or
/// disabled tree renders as the empty string.
///
/// # Example
///
/// ```
/// use vql_filter::filter::{to_vql, FilterCompiler};
///
/// let tree = FilterCompiler::compile("chr=chr1 AND (ref='A' OR ref='G')").unwrap();
/// assert_eq!(to_vql(&tree), "chr = 'chr1' AND (ref = 'A' OR ref = 'G')");
/// ```
pub fn to_vql(tree: &FilterTree) -> String {
    match tree.enabled_expr() {
        Some(FilterExpr::Logic { operator, children }) => {
            let parts: Vec<String> = children.iter().filter_map(render_nested).collect();
            parts.join(&format!(" {operator} "))
        }
        Some(FilterExpr::Condition(condition)) => condition.to_string(),
        None => String::new(),
    }
}

fn render_nested(expr: &FilterExpr) -> Option<String> {
    match expr {
        FilterExpr::Condition(condition) => Some(condition.to_string()),
        FilterExpr::Logic { operator, children } => {
            let parts: Vec<String> = children.iter().filter_map(render_nested).collect();
            match parts.len() {
                0 => None,
                1 => parts.into_iter().next(),
                _ => Some(format!("({})", parts.join(&format!(" {operator} ")))),
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.field, self.operator.lexeme())?;
        match (&self.value, self.operator.is_membership()) {
            (Literal::List(_) | Literal::Wordset(_), _) | (_, false) => {
                write!(f, "{}", self.value)
            }
            (scalar, true) => write!(f, "({scalar})"),
        }
    }
}
