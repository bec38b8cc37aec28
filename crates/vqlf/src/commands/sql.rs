//! SQL command implementation.
//!
//! Prints the SQL predicate of a WHERE expression.

use vql_filter::filter::FilterCompiler;
use vql_filter::predicate::{Predicate, PredicateGenerator};

use super::{CommandContext, Result};
use crate::output::{format_predicate_json, format_predicate_table};

/// Options for the sql command.
pub struct SqlOptions<'a> {
    /// Filter expression.
    pub expression: &'a str,
    /// Force LIKE rendering of plain patterns.
    pub like: bool,
}

/// Compiles `expression` and generates its predicate with the context's
/// catalog and table layout.
pub fn predicate(ctx: &CommandContext, opts: &SqlOptions) -> Result<Predicate> {
    let tree = FilterCompiler::compile(opts.expression)?;
    let catalog = ctx.catalog()?;
    let mut options = ctx.generator_options();
    options.like_for_plain_patterns |= opts.like;
    Ok(PredicateGenerator::new(&catalog, options).generate(&tree)?)
}

/// Executes the sql command.
pub fn execute(ctx: &CommandContext, opts: &SqlOptions) -> Result<()> {
    let predicate = predicate(ctx, opts)?;

    if ctx.json_output {
        println!("{}", format_predicate_json(&predicate)?);
    } else if !ctx.quiet {
        print!("{}", format_predicate_table(&predicate, ctx.use_colors));
    }
    Ok(())
}
