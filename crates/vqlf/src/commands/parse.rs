//! Parse command implementation.
//!
//! Compiles a WHERE expression and prints the resulting filter tree.

use tracing::debug;
use vql_filter::filter::FilterCompiler;

use super::{CommandContext, Result};
use crate::output::{format_tree_json, format_tree_table};

/// Executes the parse command.
pub fn execute(ctx: &CommandContext, expression: &str) -> Result<()> {
    let tree = FilterCompiler::compile(expression)?;
    debug!(nodes = tree.len(), "Parsed expression");

    if ctx.json_output {
        println!("{}", format_tree_json(&tree, None)?);
    } else if !ctx.quiet {
        print!("{}", format_tree_table(&tree, ctx.use_colors));
    }
    Ok(())
}
