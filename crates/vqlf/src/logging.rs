//! Logging initialization for the vqlf binary.
//!
//! Diagnostics go to stderr so stdout stays clean for command output.

use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Level used when neither flags, `RUST_LOG` nor the config choose one.
const DEFAULT_LEVEL: &str = "warn";

/// Picks the default level: `--verbose`, then `--quiet`, then the config.
pub fn default_level<'a>(cli: &Cli, configured: Option<&'a str>) -> &'a str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        configured.unwrap_or(DEFAULT_LEVEL)
    }
}

/// Builds the filter; `RUST_LOG` takes precedence over `level`.
fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vqlf={level},vql_filter={level}")))
}

/// Installs the global subscriber. Calling it twice is a no-op.
pub fn init_logging(cli: &Cli, configured: Option<&str>) {
    let filter = build_env_filter(default_level(cli, configured));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
