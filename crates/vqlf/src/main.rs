use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod dispatch;
mod logging;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, Config};
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": e.code(),
                        "message": e.to_string(),
                    }
                });
                let text = serde_json::to_string_pretty(&error_json)
                    .unwrap_or_else(|_| error_json.to_string());
                eprintln!("{text}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), CommandError> {
    let config = load_config();
    let configured_level = config
        .as_ref()
        .ok()
        .and_then(|config| config.log_level.as_deref());
    logging::init_logging(cli, configured_level);

    let config = match config {
        Ok(config) => config,
        // path and init work without a readable config
        Err(e) if repairs_config(cli) => {
            tracing::warn!(error = %e, "Ignoring unreadable config");
            Config::default()
        }
        Err(e) => return Err(e),
    };

    let ctx = CommandContext::from_cli(cli, config);
    dispatch::dispatch(cli, &ctx)
}

fn repairs_config(cli: &Cli) -> bool {
    matches!(
        &cli.command,
        Some(Commands::Config {
            command: Some(ConfigCommands::Path | ConfigCommands::Init { .. })
        })
    )
}
