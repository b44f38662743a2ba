//! Layered configuration for the mcp-bridge client.
//!
//! This crate provides:
//! - [`BridgeConfig`]: session and logging settings
//! - [`load_merged`]: global + local files merged, then env overrides
//! - [`schema`]: JSON Schema for editor completion
//! - [`validation`]: advisory warnings that never block loading
//!
//! # Configuration Precedence (lowest to highest)
//! 1. Default values
//! 2. Global config (`~/.config/mcp-bridge/mcp-bridge.json`)
//! 3. Local config (`./mcp-bridge.json`)
//! 4. Environment variables
//!
//! # Example
//! ```no_run
//! use bridge_config::load_merged;
//! use std::path::Path;
//!
//! let loaded = load_merged(Path::new(".")).unwrap();
//! println!("connect timeout: {}s", loaded.config.session.timeout_secs);
//!
//! for warning in &loaded.warnings {
//!     eprintln!("Warning: {}", warning);
//! }
//! ```
//!
//! # Environment Variables
//! - `MCP_BRIDGE_TIMEOUT_SECS`: connect and handshake timeout
//! - `MCP_BRIDGE_CALL_TIMEOUT_SECS`: default per-call deadline
//! - `MCP_BRIDGE_AUTH_TOKEN`: bearer token for HTTP servers (env-only)
//! - `MCP_BRIDGE_LOG_LEVEL`: override log level
//! - `MCP_BRIDGE_LOG_JSON`: enable JSON logging ("true" or "1")

pub mod loader;
pub mod merge;
pub mod schema;
pub mod types;
pub mod validation;
pub mod writer;

pub use loader::{LoadedBridgeConfig, load_merged};
pub use schema::schema_json_pretty;
pub use types::{BridgeConfig, LoggingConfig, SessionConfig};
pub use validation::AdvisoryWarning;
