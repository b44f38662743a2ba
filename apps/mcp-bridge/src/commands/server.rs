//! Commands that connect to a server.

use crate::{args, output};
use anyhow::{Context, Result};
use bridge_config::BridgeConfig;
use clap::{Args, ValueEnum};
use mcp_bridge_core::{
    BridgedServer, DiscoveryOptions, ResourceDescriptor, ResourceHandle, ResourceReader,
    TextFormat, TextOptions, providers,
};
use mcp_bridge_rmcp::{ConnectOptions, RmcpSession, TransportSpec};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Args)]
pub struct ConnectArgs {
    /// Server URL, `npx` package command, or stdio command line (quote it)
    target: String,

    /// Connect and handshake timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Per-call deadline in seconds
    #[arg(long, value_name = "SECS")]
    call_timeout: Option<u64>,

    /// Extra HTTP header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Bearer token for HTTP servers (defaults to MCP_BRIDGE_AUTH_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Directory the server may work in, offered as a filesystem root (repeatable)
    #[arg(long = "root", value_name = "DIR")]
    roots: Vec<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SchemaFormat {
    Mcp,
    Openai,
    Anthropic,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    conn: ConnectArgs,

    /// Print tool definitions as JSON in a provider format
    #[arg(long, value_enum)]
    format: Option<SchemaFormat>,
}

#[derive(Args)]
pub struct CallArgs {
    #[command(flatten)]
    conn: ConnectArgs,

    /// Tool name (remote name or snake_case alias)
    tool: String,

    /// Arguments as key=value; values are parsed as JSON when possible
    #[arg(value_name = "KEY=VALUE")]
    args: Vec<String>,

    /// Arguments as a JSON object, merged under key=value pairs
    #[arg(long, value_name = "OBJECT")]
    json_args: Option<String>,

    /// Print the hydrated result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct ReadArgs {
    #[command(flatten)]
    conn: ConnectArgs,

    /// Resource URI or attribute name (APP_SETTINGS, cpu_load)
    resource: String,
}

#[derive(Args)]
pub struct PromptArgs {
    #[command(flatten)]
    conn: ConnectArgs,

    /// Prompt name or snake_case alias
    name: String,

    /// Arguments as key=value; values are always strings
    #[arg(value_name = "KEY=VALUE")]
    args: Vec<String>,
}

fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("expected 'Name: value', got '{raw}'"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn transport(conn: &ConnectArgs, config: &BridgeConfig) -> Result<TransportSpec> {
    let mut spec = TransportSpec::detect(&conn.target)?.with_headers(config.session.headers.clone());
    for raw in &conn.headers {
        let (name, value) = parse_header(raw)?;
        spec = spec.with_header(name, value);
    }
    let token = conn.token.clone().or_else(|| {
        config
            .session
            .auth_token
            .as_ref()
            .map(|t| t.expose_secret().to_string())
    });
    if let Some(token) = token {
        spec = spec.with_bearer(token);
    }
    Ok(spec)
}

async fn open(conn: &ConnectArgs, config: &BridgeConfig) -> Result<(Arc<RmcpSession>, BridgedServer)> {
    let spec = transport(conn, config)?;
    let timeout = conn
        .timeout
        .map_or_else(|| config.session.timeout(), Duration::from_secs);
    let options = ConnectOptions::default()
        .with_timeout(timeout)
        .with_roots(conn.roots.iter().cloned());
    debug!(
        server = spec.label(),
        http = spec.is_http(),
        timeout = ?timeout,
        roots = options.roots.len(),
        "opening session"
    );
    let session = RmcpSession::connect(&spec, &options)
        .await
        .with_context(|| format!("Failed to connect to {}", spec.label()))?;
    let session = Arc::new(session);

    let discovery = DiscoveryOptions {
        call_timeout: conn
            .call_timeout
            .map(Duration::from_secs)
            .or_else(|| config.session.call_timeout()),
    };
    match BridgedServer::discover(Arc::clone(&session), &discovery).await {
        Ok(server) => Ok((session, server)),
        Err(e) => {
            session.close().await;
            Err(e).context("Failed to discover server capabilities")
        }
    }
}

pub async fn list(a: ListArgs, config: &BridgeConfig) -> Result<()> {
    let (session, server) = open(&a.conn, config).await?;
    let outcome = match a.format {
        None => {
            output::print_listing(&server);
            Ok(())
        }
        Some(format) => {
            let defs: Vec<Value> = server
                .tools()
                .iter()
                .map(|t| match format {
                    SchemaFormat::Mcp => providers::mcp::render_tool(t.descriptor()),
                    SchemaFormat::Openai => providers::openai::render_function(t.descriptor(), false),
                    SchemaFormat::Anthropic => providers::anthropic::render_tool(t.descriptor(), false),
                })
                .collect();
            serde_json::to_string_pretty(&defs)
                .map(|s| println!("{s}"))
                .map_err(anyhow::Error::from)
        }
    };
    session.close().await;
    outcome
}

pub async fn call(a: CallArgs, config: &BridgeConfig) -> Result<()> {
    let arguments = args::build(a.json_args.as_deref(), &a.args)?;
    let (session, server) = open(&a.conn, config).await?;
    let outcome = match server.tool(&a.tool) {
        Some(tool) => tool
            .call_async(arguments)
            .await
            .map(|result| output::print_hydrated(&result, a.json))
            .map_err(anyhow::Error::from),
        None => Err(anyhow::anyhow!("No tool named '{}' on {}", a.tool, server.server_name())),
    };
    session.close().await;
    outcome
}

pub async fn read(a: ReadArgs, config: &BridgeConfig) -> Result<()> {
    let (session, server) = open(&a.conn, config).await?;
    let handle = match server.resource(&a.resource) {
        Some(h) => Some(h.clone()),
        // Unlisted URIs (resource templates) are read directly.
        None if a.resource.contains("://") => {
            let reader: Arc<dyn ResourceReader> = Arc::<RmcpSession>::clone(&session);
            Some(ResourceHandle::new(
                ResourceDescriptor::new(&a.resource),
                reader,
                Arc::clone(server.resource_cache()),
            ))
        }
        None => None,
    };
    let outcome = match handle {
        Some(h) => h.read_async().await.map_err(anyhow::Error::from).map(|contents| {
            for item in &contents {
                println!("{}", item.fmt_text(&TextOptions::default()));
            }
        }),
        None => Err(anyhow::anyhow!(
            "No resource '{}' on {}",
            a.resource,
            server.server_name()
        )),
    };
    session.close().await;
    outcome
}

pub async fn prompt(a: PromptArgs, config: &BridgeConfig) -> Result<()> {
    let arguments = args::build_text(&a.args)?;
    let (session, server) = open(&a.conn, config).await?;
    let outcome = match server.prompt(&a.name) {
        Some(p) => p
            .get_async(arguments)
            .await
            .map(|messages| println!("{}", messages.fmt_text(&TextOptions::default())))
            .map_err(anyhow::Error::from),
        None => Err(anyhow::anyhow!("No prompt named '{}' on {}", a.name, server.server_name())),
    };
    session.close().await;
    outcome
}
