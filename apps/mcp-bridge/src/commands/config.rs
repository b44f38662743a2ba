//! Configuration management commands.

use anyhow::Result;
use bridge_config::{
    loader::{global_config_path, load_merged},
    types::BridgeConfig,
    writer::{init_local, write_pretty_json_atomic},
};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init {
        /// Create global config instead of local
        #[arg(long)]
        global: bool,

        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the merged configuration
    Show {
        /// Output as raw JSON (no formatting)
        #[arg(long)]
        json: bool,

        /// Path to use as local directory (defaults to current dir)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Output the JSON Schema for mcp-bridge.json
    Schema,

    /// Validate configuration and show warnings
    Validate {
        /// Path to use as local directory (defaults to current dir)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn execute(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Init { global, force } => cmd_init(global, force),
        ConfigCommands::Show { json, path } => cmd_show(json, path),
        ConfigCommands::Schema => cmd_schema(),
        ConfigCommands::Validate { path } => cmd_validate(path),
    }
}

fn local_dir(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p),
        None => Ok(std::env::current_dir()?),
    }
}

fn cmd_init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        let path = global_config_path()?;
        if path.exists() && !force {
            anyhow::bail!(
                "Config file already exists: {}\nUse --force to overwrite",
                path.display()
            );
        }
        write_pretty_json_atomic(&path, &serde_json::to_value(BridgeConfig::default())?)?;
        path
    } else {
        init_local(&std::env::current_dir()?, force)?
    };

    println!(
        "{} Created {}",
        "OK".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

fn cmd_show(json_output: bool, path: Option<PathBuf>) -> Result<()> {
    let loaded = load_merged(&local_dir(path)?)?;

    for warning in &loaded.warnings {
        eprintln!("{} {}", "WARN".yellow(), warning);
    }

    if json_output {
        println!("{}", serde_json::to_string(&loaded.config)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&loaded.config)?);
    }
    Ok(())
}

fn cmd_schema() -> Result<()> {
    println!("{}", bridge_config::schema_json_pretty()?);
    Ok(())
}

fn cmd_validate(path: Option<PathBuf>) -> Result<()> {
    let loaded = load_merged(&local_dir(path)?)?;

    println!("Global: {}", loaded.paths.global.display());
    println!("Local:  {}", loaded.paths.local.display());

    if loaded.warnings.is_empty() {
        println!("{} Configuration is valid", "OK".green());
    } else {
        println!("{} Configuration has warnings:", "WARN".yellow());
        for w in &loaded.warnings {
            println!("  - {w}");
        }
    }
    Ok(())
}
