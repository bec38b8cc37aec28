//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the vqlf CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// vqlf - Compile, inspect and store VQL filter expressions
#[derive(Parser, Debug)]
#[command(name = "vqlf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Field catalog file, JSON or TOML (default: from config)
    #[arg(long, global = true, env = "VQLF_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Saved filter store file (default: XDG data directory)
    #[arg(long, global = true, env = "VQLF_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a WHERE expression and print its filter tree
    #[command(alias = "p")]
    Parse {
        /// Filter expression (e.g., "chr = 'chr1' AND pos > 100")
        expression: String,
    },

    /// Print the SQL predicate of a WHERE expression
    Sql {
        /// Filter expression
        expression: String,

        /// Render plain =~ / !~ patterns as LIKE '%v%'
        #[arg(long)]
        like: bool,
    },

    /// Build a full SQL statement from a VQL SELECT
    Select {
        /// Statement (e.g., "SELECT chr, pos FROM variants WHERE pos > 100")
        statement: String,

        /// Sort by field (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        order_by: Vec<String>,

        /// Sort in descending order
        #[arg(long, requires = "order_by")]
        desc: bool,

        /// Limit results
        #[arg(long)]
        limit: Option<u64>,

        /// Skip the first N results
        #[arg(long)]
        offset: Option<u64>,
    },

    /// Render a filter mapping back to VQL text
    Render {
        /// Mapping file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// Manage saved filters
    Saved {
        #[command(subcommand)]
        command: Option<SavedCommands>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Saved filter subcommands
#[derive(Subcommand, Debug)]
pub enum SavedCommands {
    /// List saved filters
    List,

    /// Show a saved filter
    Show {
        /// Filter name
        name: String,
    },

    /// Compile an expression and save it under a name
    Save {
        /// Filter name
        name: String,

        /// Filter expression
        expression: String,
    },

    /// Delete a saved filter
    Delete {
        /// Filter name
        name: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,

    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
