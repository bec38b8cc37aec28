//! Select command implementation.
//!
//! Builds a full SQL statement from a VQL SELECT.

use vql_filter::filter::FilterCompiler;
use vql_filter::query::SelectQuery;

use super::{CommandContext, Result};
use crate::output::{format_select_json, format_select_table};

/// Options for the select command.
pub struct SelectOptions<'a> {
    /// VQL statement.
    pub statement: &'a str,
    /// Sort keys.
    pub order_by: &'a [String],
    /// Sort descending.
    pub descending: bool,
    /// Maximum row count.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

/// Builds the SQL text of the statement.
pub fn build_sql(ctx: &CommandContext, opts: &SelectOptions) -> Result<String> {
    let statement = FilterCompiler::compile_statement(opts.statement)?;
    let mut query = SelectQuery::from(statement);
    for field in opts.order_by {
        query = query.order_by(field.as_str(), opts.descending);
    }
    if let Some(limit) = opts.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = opts.offset {
        query = query.offset(offset);
    }

    let catalog = ctx.catalog()?;
    Ok(query.to_sql(&catalog, &ctx.generator_options())?)
}

/// Executes the select command.
pub fn execute(ctx: &CommandContext, opts: &SelectOptions) -> Result<()> {
    let sql = build_sql(ctx, opts)?;

    if ctx.json_output {
        println!("{}", format_select_json(&sql)?);
    } else if !ctx.quiet {
        print!("{}", format_select_table(&sql));
    }
    Ok(())
}
