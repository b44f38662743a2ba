//! rmcp-backed sessions for the MCP bridge.
//!
//! [`RmcpSession`] implements every collaborator trait from
//! [`mcp_bridge_core::remote`] over stdio child processes or streamable HTTP.
//! [`load_server`] connects and discovers in one step:
//!
//! ```no_run
//! # async fn demo() -> Result<(), mcp_bridge_rmcp::SessionError> {
//! use mcp_bridge_rmcp::{ConnectOptions, TransportSpec, load_server};
//! use mcp_bridge_core::DiscoveryOptions;
//! use serde_json::json;
//!
//! let spec = TransportSpec::detect("npx -y @modelcontextprotocol/server-everything")?;
//! let server = load_server(&spec, &ConnectOptions::default(), &DiscoveryOptions::default()).await?;
//! let sum = server.tool("add").unwrap().call_async(json!({"a": 1, "b": 2})).await?;
//! println!("{}", sum.value());
//! # Ok(())
//! # }
//! ```

pub mod convert;
mod error;
pub mod roots;
mod session;
mod transport;

pub use error::SessionError;
pub use roots::{RootsHandler, normalize_roots};
pub use session::{ConnectOptions, RmcpSession};
pub use transport::TransportSpec;

use mcp_bridge_core::{BridgedServer, DiscoveryOptions};
use std::sync::Arc;

/// Connect to `spec` and discover its tools, resources and prompts.
pub async fn load_server(
    spec: &TransportSpec,
    connect: &ConnectOptions,
    discovery: &DiscoveryOptions,
) -> Result<BridgedServer, SessionError> {
    let session = Arc::new(RmcpSession::connect(spec, connect).await?);
    Ok(BridgedServer::discover(session, discovery).await?)
}

/// [`load_server`] for synchronous code. The connection is driven by a
/// runtime owned by the session.
pub fn load_server_blocking(
    spec: &TransportSpec,
    connect: &ConnectOptions,
    discovery: &DiscoveryOptions,
) -> Result<BridgedServer, SessionError> {
    let session = Arc::new(RmcpSession::connect_blocking(spec, connect)?);
    Ok(BridgedServer::discover_blocking(session, discovery)?)
}
