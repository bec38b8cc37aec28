//! Render command implementation.
//!
//! Reads a canonical filter mapping and prints it as VQL text.

use std::fs;
use std::io::{self, Read};

use serde_json::Value;
use vql_filter::filter::to_vql;
use vql_filter::mapping::from_mapping;

use super::{CommandContext, Result};

/// Reads the mapping from a file path, or from stdin for `-`.
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

/// Converts mapping text to VQL text.
pub fn render_mapping(text: &str) -> Result<String> {
    let mapping: Value = serde_json::from_str(text)?;
    let tree = from_mapping(&mapping)?;
    Ok(to_vql(&tree))
}

/// Executes the render command.
pub fn execute(ctx: &CommandContext, input: &str) -> Result<()> {
    let vql = render_mapping(&read_input(input)?)?;

    if ctx.json_output {
        let output = serde_json::json!({ "vql": vql });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("{vql}");
    }
    Ok(())
}
