//! Command implementations for the vqlf CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod parse;
pub mod render;
pub mod saved;
pub mod select;
pub mod sql;

use std::fs;
use std::path::{Path, PathBuf};

use vql_filter::predicate::{GeneratorOptions, StaticCatalog};
use vql_filter::store::FilterStore;

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter engine error (syntax, resolution, mapping, storage).
    #[error(transparent)]
    Filter(#[from] vql_filter::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A saved filter name that is not in the store.
    #[error("no saved filter named '{name}'")]
    UnknownFilter { name: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Converts each engine error through the crate-level error.
macro_rules! impl_from_engine_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for CommandError {
                fn from(error: $error) -> Self {
                    CommandError::Filter(error.into())
                }
            }
        )*
    };
}

impl_from_engine_error!(
    vql_filter::filter::SyntaxError,
    vql_filter::tree::StructuralError,
    vql_filter::mapping::MappingError,
    vql_filter::predicate::ResolutionError,
    vql_filter::store::FilterStoreError,
);

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Catalog file from the command line, overriding the config.
    pub catalog_path: Option<PathBuf>,
    /// Store file from the command line.
    pub store_path: Option<PathBuf>,
    /// Loaded configuration.
    pub config: Config,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    pub fn from_cli(cli: &Cli, config: Config) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
            verbose: cli.verbose,
            catalog_path: cli.catalog.clone(),
            store_path: cli.store.clone(),
            config,
        }
    }

    /// Loads the field catalog named on the command line or in the config.
    pub fn catalog(&self) -> Result<StaticCatalog> {
        let path = self
            .catalog_path
            .as_ref()
            .or(self.config.catalog.as_ref())
            .ok_or_else(|| {
                CommandError::Config(
                    "no field catalog configured; pass --catalog or set `catalog` in the config"
                        .to_string(),
                )
            })?;
        load_catalog(path)
    }

    /// Predicate generation options from the config.
    pub fn generator_options(&self) -> GeneratorOptions {
        self.config.tables.clone()
    }

    /// Opens the saved filter store.
    pub fn store(&self) -> Result<FilterStore> {
        match &self.store_path {
            Some(path) => Ok(FilterStore::with_path(path)),
            None => Ok(FilterStore::new()?),
        }
    }
}

/// Reads a catalog file; `.toml` files are TOML, anything else JSON.
pub fn load_catalog(path: &Path) -> Result<StaticCatalog> {
    let content = fs::read_to_string(path).map_err(|e| {
        CommandError::Config(format!(
            "Failed to read catalog '{}': {}",
            path.display(),
            e
        ))
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let catalog = if is_toml {
        toml::from_str(&content).map_err(|e| {
            CommandError::Config(format!(
                "Failed to parse catalog '{}': {}",
                path.display(),
                e
            ))
        })?
    } else {
        serde_json::from_str(&content).map_err(|e| {
            CommandError::Config(format!(
                "Failed to parse catalog '{}': {}",
                path.display(),
                e
            ))
        })?
    };
    tracing::debug!(path = %path.display(), "Loaded field catalog");
    Ok(catalog)
}

impl CommandError {
    /// Returns the error code string for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Filter(vql_filter::Error::Syntax(_)) => "SYNTAX_ERROR",
            CommandError::Filter(vql_filter::Error::Resolution(_)) => "RESOLUTION_ERROR",
            CommandError::Filter(vql_filter::Error::Structural(_)) => "STRUCTURAL_ERROR",
            CommandError::Filter(vql_filter::Error::Mapping(_)) => "MAPPING_ERROR",
            CommandError::Filter(vql_filter::Error::Store(_)) => "STORE_ERROR",
            CommandError::Config(_) => "CONFIG_ERROR",
            CommandError::UnknownFilter { .. } => "NOT_FOUND",
            CommandError::Io(_) => "IO_ERROR",
            CommandError::Json(_) => "JSON_ERROR",
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CommandError::Filter(e) => e.exit_code().try_into().unwrap_or(1),
            CommandError::Config(_) | CommandError::UnknownFilter { .. } => 5,
            CommandError::Io(_) => 3,
            CommandError::Json(_) => 4,
        }
    }
}
