use mcp_bridge_core::BridgeError;
use std::time::Duration;
use thiserror::Error;

/// Failures while establishing or tearing down a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No server target given")]
    EmptyTarget,

    #[error("npx target has no package: {0}")]
    MissingPackage(String),

    #[error("Failed to spawn '{command}': {message}")]
    Spawn { command: String, message: String },

    #[error("Invalid HTTP client configuration: {0}")]
    HttpClient(String),

    #[error("Handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Server info not available after handshake")]
    MissingServerInfo,

    #[error("Blocking connect called from inside an async runtime; use connect().await")]
    NestedRuntime,

    #[error("Invalid root: {0}")]
    Roots(String),

    #[error("Failed to start driver runtime: {0}")]
    Runtime(String),

    #[error("Discovery failed: {0}")]
    Discovery(#[from] BridgeError),
}
