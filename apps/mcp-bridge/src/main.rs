//! mcp-bridge command line.
//!
//! Connects to an MCP server (a URL, an `npx` package, or any stdio command)
//! and exposes its tools, resources and prompts as subcommands.

use anyhow::Result;
use bridge_config::{BridgeConfig, LoadedBridgeConfig, load_merged};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod output;

#[derive(Parser)]
#[command(name = "mcp-bridge")]
#[command(about = "Call MCP server tools, resources and prompts from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List a server's tools, resources and prompts
    List(commands::server::ListArgs),

    /// Call a tool with key=value arguments
    Call(commands::server::CallArgs),

    /// Read a resource by URI or attribute name
    Read(commands::server::ReadArgs),

    /// Render a prompt with key=value arguments
    Prompt(commands::server::PromptArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

fn init_logging(verbose: u8, loaded: Option<&LoadedBridgeConfig>) {
    let configured = loaded.map_or("warn", |l| l.config.logging.level.as_str());
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if loaded.is_some_and(|l| l.config.logging.json) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config must not stop `config` subcommands from reporting it.
    let loaded = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|dir| load_merged(&dir));
    init_logging(cli.verbose, loaded.as_ref().ok());

    // Install the rustls CryptoProvider before any HTTP clients are created.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    match cli.command {
        Commands::Config { command } => commands::config::execute(command),
        Commands::List(a) => commands::server::list(a, &settle(loaded)?).await,
        Commands::Call(a) => commands::server::call(a, &settle(loaded)?).await,
        Commands::Read(a) => commands::server::read(a, &settle(loaded)?).await,
        Commands::Prompt(a) => commands::server::prompt(a, &settle(loaded)?).await,
    }
}

/// Surface load failures and advisory warnings before talking to a server.
fn settle(loaded: Result<LoadedBridgeConfig>) -> Result<BridgeConfig> {
    let loaded = loaded?;
    for warning in &loaded.warnings {
        eprintln!("{} {}", "WARN".yellow(), warning);
    }
    Ok(loaded.config)
}
