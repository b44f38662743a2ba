//! Configuration types.
//!
//! The root type is [`BridgeConfig`]. Every section uses `#[serde(default)]`,
//! so a file only needs the keys it changes.

use schemars::JsonSchema;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Root configuration, loaded from `mcp-bridge.json` files.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BridgeConfig {
    /// Optional JSON Schema URL for IDE autocomplete support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Connection and call settings.
    pub session: SessionConfig,

    /// Logging and diagnostics configuration.
    pub logging: LoggingConfig,
}

/// Settings applied to every server connection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds allowed for connecting and the initialize handshake.
    pub timeout_secs: u64,

    /// Default deadline in seconds for each tool call. Unset means no deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,

    /// Extra HTTP headers sent to streamable HTTP servers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Bearer token for HTTP servers (env-only, never serialized).
    #[serde(skip)]
    #[schemars(skip)]
    pub auth_token: Option<SecretString>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            call_timeout_secs: None,
            headers: BTreeMap::new(),
            auth_token: None,
        }
    }
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

/// Logging and diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Whether to enable JSON-formatted logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = BridgeConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"session\""));
        assert!(json.contains("\"logging\""));
        assert!(!json.contains("auth_token"));
        assert!(!json.contains("call_timeout_secs"));
    }

    #[test]
    fn test_partial_config_deserializes() {
        let json = r#"{"session": {"call_timeout_secs": 5}}"#;
        let config: BridgeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.session.call_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.session.timeout_secs, 30);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_auth_token_is_not_read_from_files() {
        let json = r#"{"session": {"auth_token": "leaked"}}"#;
        let config: BridgeConfig = serde_json::from_str(json).unwrap();
        assert!(config.session.auth_token.is_none());
    }

    #[test]
    fn test_headers_round_trip() {
        let json = r#"{"session": {"headers": {"X-Team": "core"}}}"#;
        let config: BridgeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.session.headers.get("X-Team").map(String::as_str), Some("core"));
        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["session"]["headers"]["X-Team"], "core");
    }
}
