//! Command dispatch module for routing CLI commands to their handlers.

use crate::cli::{Cli, Commands, ConfigCommands, SavedCommands};
use crate::commands::{self, CommandContext, CommandError, Result};

/// Runs the command selected on the command line.
pub fn dispatch(cli: &Cli, ctx: &CommandContext) -> Result<()> {
    let Some(command) = &cli.command else {
        if !ctx.quiet {
            println!("vqlf - VQL filter CLI");
            println!("Use --help for usage information");
        }
        return Ok(());
    };

    match command {
        Commands::Parse { expression } => commands::parse::execute(ctx, expression),
        Commands::Sql { expression, like } => {
            let opts = commands::sql::SqlOptions {
                expression,
                like: *like,
            };
            commands::sql::execute(ctx, &opts)
        }
        Commands::Select {
            statement,
            order_by,
            desc,
            limit,
            offset,
        } => {
            let opts = commands::select::SelectOptions {
                statement,
                order_by,
                descending: *desc,
                limit: *limit,
                offset: *offset,
            };
            commands::select::execute(ctx, &opts)
        }
        Commands::Render { input } => commands::render::execute(ctx, input),
        Commands::Saved { command } => dispatch_saved(ctx, command),
        Commands::Config { command } => dispatch_config(ctx, command),
        Commands::Completions { shell } => {
            commands::completions::execute(shell).map_err(CommandError::Io)
        }
    }
}

/// Dispatch saved filter subcommands.
fn dispatch_saved(ctx: &CommandContext, command: &Option<SavedCommands>) -> Result<()> {
    match command {
        Some(SavedCommands::List) | None => commands::saved::execute_list(ctx),
        Some(SavedCommands::Show { name }) => commands::saved::execute_show(ctx, name),
        Some(SavedCommands::Save { name, expression }) => {
            commands::saved::execute_save(ctx, name, expression)
        }
        Some(SavedCommands::Delete { name }) => commands::saved::execute_delete(ctx, name),
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
        Some(ConfigCommands::Init { force }) => commands::config::execute_init(ctx, *force),
    }
}
