//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/vqlf/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use vql_filter::predicate::GeneratorOptions;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "VQLF_CONFIG";

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# vqlf - VQL filter CLI configuration

# Config schema version (do not modify)
version = 1

# Field catalog file, JSON or TOML (can also use --catalog or VQLF_CATALOG)
# catalog = "/path/to/catalog.json"

# Default log level when RUST_LOG is unset: "error", "warn", "info", "debug", "trace"
# log_level = "warn"

# Output preferences
[output]
# color = true

# SQL names used by predicate generation
[tables]
# plain_table = "variants"
# group_prefix = "ann"
# group_table = "annotations"
# instance_prefix = "samples"
# instance_alias_prefix = "sample_"
# instance_table = "genotypes"
# like_for_plain_patterns = false
"#;

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Field catalog file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Table layout and predicate options.
    #[serde(default)]
    pub tables: GeneratorOptions,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: None,
            log_level: None,
            output: OutputConfig::default(),
            tables: GeneratorOptions::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config file path.
///
/// `$VQLF_CONFIG` wins, then `$XDG_CONFIG_HOME/vqlf/config.toml`, then
/// `~/.config/vqlf/config.toml` on all platforms.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("vqlf").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("vqlf").join("config.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk; a missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than supported version {}",
            config.version, CONFIG_VERSION
        )));
    }
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;
    let config = &ctx.config;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        println!("Settings:");
        match &config.catalog {
            Some(catalog) => println!("  catalog: {}", catalog.display()),
            None => println!("  catalog: (not set)"),
        }
        if let Some(ref level) = config.log_level {
            println!("  log_level: {}", level);
        }

        println!("\n[output]");
        if let Some(color) = config.output.color {
            println!("  color: {}", color);
        }

        let tables = &config.tables;
        println!("\n[tables]");
        println!("  plain_table: {}", tables.layout.plain_table);
        println!("  group_prefix: {}", tables.layout.group_prefix);
        println!("  group_table: {}", tables.layout.group_table);
        println!("  instance_prefix: {}", tables.layout.instance_prefix);
        println!("  instance_alias_prefix: {}", tables.layout.instance_alias_prefix);
        println!("  instance_table: {}", tables.layout.instance_table);
        println!("  like_for_plain_patterns: {}", tables.like_for_plain_patterns);

        if !path.exists() {
            println!("\n(No config file exists. Run 'vqlf config init' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("Failed to create config directory: {}", e))
        })?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created default config at: {}", path.display());
    }

    Ok(())
}
