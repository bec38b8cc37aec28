//! Saved filter command implementations.
//!
//! List, show, save and delete named filters in the filter store.

use tracing::debug;
use vql_filter::filter::FilterCompiler;

use super::{CommandContext, CommandError, Result};
use crate::output::{
    format_deleted_filter, format_saved_filter, format_saved_json, format_saved_table,
    format_tree_json, format_tree_table,
};

/// Executes the saved list command.
pub fn execute_list(ctx: &CommandContext) -> Result<()> {
    let saved = ctx.store()?.load_or_default()?;

    if ctx.json_output {
        println!("{}", format_saved_json(&saved)?);
    } else if !ctx.quiet {
        print!("{}", format_saved_table(&saved, ctx.use_colors));
    }
    Ok(())
}

/// Executes the saved show command.
pub fn execute_show(ctx: &CommandContext, name: &str) -> Result<()> {
    let saved = ctx.store()?.load_or_default()?;
    let tree = saved.get(name)?.ok_or_else(|| CommandError::UnknownFilter {
        name: name.to_string(),
    })?;

    if ctx.json_output {
        println!("{}", format_tree_json(&tree, Some(name))?);
    } else if !ctx.quiet {
        print!("{}", format_tree_table(&tree, ctx.use_colors));
    }
    Ok(())
}

/// Executes the saved save command.
///
/// The expression is compiled before the store is touched, so a syntax
/// error leaves the file unchanged.
pub fn execute_save(ctx: &CommandContext, name: &str, expression: &str) -> Result<()> {
    let tree = FilterCompiler::compile(expression)?;

    let store = ctx.store()?;
    let mut saved = store.load_or_default()?;
    let replaced = saved.put(name, &tree);
    store.save(&saved)?;
    debug!(name, replaced, "Saved filter");

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "name": name,
            "replaced": replaced,
            "path": store.path().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        print!("{}", format_saved_filter(name, &tree, replaced));
    }
    Ok(())
}

/// Executes the saved delete command.
pub fn execute_delete(ctx: &CommandContext, name: &str) -> Result<()> {
    let store = ctx.store()?;
    let mut saved = store.load_or_default()?;
    if !saved.remove(name) {
        return Err(CommandError::UnknownFilter {
            name: name.to_string(),
        });
    }
    store.save(&saved)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "name": name,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        print!("{}", format_deleted_filter(name));
    }
    Ok(())
}
