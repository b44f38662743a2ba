//! Configuration loader: global file, local file, env overrides.
//!
//! Both files are read as JSON objects and merged with RFC 7396 semantics
//! before a single typed deserialization. Env overrides are applied last,
//! then advisory validation runs.

use crate::{merge::merge_patch, types::BridgeConfig, validation::AdvisoryWarning};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Filename for local config.
pub const LOCAL_FILE: &str = "mcp-bridge.json";

/// Directory name under `config_dir` for global config.
pub const GLOBAL_DIR: &str = "mcp-bridge";

/// Filename for global config.
pub const GLOBAL_FILE: &str = "mcp-bridge.json";

/// Resolved paths for config files.
#[derive(Debug, Clone)]
pub struct BridgeConfigPaths {
    pub local: PathBuf,
    pub global: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct LoadedBridgeConfig {
    /// The loaded and merged configuration.
    pub config: BridgeConfig,

    /// Advisory warnings from env parsing and validation.
    pub warnings: Vec<AdvisoryWarning>,

    /// Resolved config file paths.
    pub paths: BridgeConfigPaths,
}

/// Get the global config file path.
///
/// Returns `~/.config/mcp-bridge/mcp-bridge.json` on Linux.
pub fn global_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config dir")?;
    Ok(base.join(GLOBAL_DIR).join(GLOBAL_FILE))
}

/// Get the local config file path for a given directory.
pub fn local_config_path(local_dir: &Path) -> PathBuf {
    local_dir.join(LOCAL_FILE)
}

/// Load and merge configuration for `local_dir`.
pub fn load_merged(local_dir: &Path) -> Result<LoadedBridgeConfig> {
    load_from(&global_config_path()?, local_dir)
}

/// Load with an explicit global file location.
pub fn load_from(global_path: &Path, local_dir: &Path) -> Result<LoadedBridgeConfig> {
    let local_path = local_config_path(local_dir);

    let global_v = read_json_object_or_empty(global_path)?;
    let local_v = read_json_object_or_empty(&local_path)?;
    let merged = merge_patch(global_v, local_v);

    let mut cfg: BridgeConfig =
        serde_json::from_value(merged).context("Failed to deserialize merged mcp-bridge config")?;

    let mut warnings = apply_env_overrides(&mut cfg);
    warnings.extend(crate::validation::validate(&cfg));

    Ok(LoadedBridgeConfig {
        config: cfg,
        warnings,
        paths: BridgeConfigPaths {
            local: local_path,
            global: global_path.to_path_buf(),
        },
    })
}

/// Apply environment variable overrides, returning warnings for values
/// that could not be parsed.
fn apply_env_overrides(cfg: &mut BridgeConfig) -> Vec<AdvisoryWarning> {
    let mut warnings = vec![];

    if let Some(v) = env_trimmed("MCP_BRIDGE_TIMEOUT_SECS") {
        match v.parse() {
            Ok(secs) => cfg.session.timeout_secs = secs,
            Err(_) => warnings.push(unparsable("MCP_BRIDGE_TIMEOUT_SECS", &v)),
        }
    }
    if let Some(v) = env_trimmed("MCP_BRIDGE_CALL_TIMEOUT_SECS") {
        match v.parse() {
            Ok(secs) => cfg.session.call_timeout_secs = Some(secs),
            Err(_) => warnings.push(unparsable("MCP_BRIDGE_CALL_TIMEOUT_SECS", &v)),
        }
    }

    // Env-only
    if let Some(token) = env_trimmed("MCP_BRIDGE_AUTH_TOKEN") {
        cfg.session.auth_token = Some(secrecy::SecretString::from(token));
    }

    if let Some(v) = env_trimmed("MCP_BRIDGE_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_trimmed("MCP_BRIDGE_LOG_JSON") {
        cfg.logging.json = v.eq_ignore_ascii_case("true") || v == "1";
    }

    warnings
}

fn unparsable(var: &'static str, value: &str) -> AdvisoryWarning {
    AdvisoryWarning {
        code: "env.unparsable",
        path: var,
        message: format!("Expected a whole number of seconds, got '{value}'; ignored"),
    }
}

/// Helper to read and normalize an env var (trim + filter empty).
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a JSON file as a Value, returning an empty object if it doesn't exist.
fn read_json_object_or_empty(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let v: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match v {
        Value::Object(_) => Ok(v),
        _ => anyhow::bail!("Config root must be a JSON object: {}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 5] = [
        "MCP_BRIDGE_TIMEOUT_SECS",
        "MCP_BRIDGE_CALL_TIMEOUT_SECS",
        "MCP_BRIDGE_AUTH_TOKEN",
        "MCP_BRIDGE_LOG_LEVEL",
        "MCP_BRIDGE_LOG_JSON",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            // SAFETY: callers run serially via #[serial]
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    fn write(dir: &Path, file: &str, body: &str) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(file);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_load_no_files_returns_defaults() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let loaded = load_from(&temp.path().join("missing.json"), temp.path()).unwrap();

        assert_eq!(loaded.config.session.timeout_secs, 30);
        assert_eq!(loaded.config.session.call_timeout_secs, None);
        assert_eq!(loaded.config.logging.level, "warn");
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    #[serial]
    fn test_local_overrides_global() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let global = write(
            &temp.path().join("global"),
            GLOBAL_FILE,
            r#"{"session": {"timeout_secs": 10, "call_timeout_secs": 4}, "logging": {"json": true}}"#,
        );
        let local_dir = temp.path().join("repo");
        write(&local_dir, LOCAL_FILE, r#"{"session": {"timeout_secs": 60}}"#);

        let loaded = load_from(&global, &local_dir).unwrap();
        assert_eq!(loaded.config.session.timeout_secs, 60);
        // Keys the local file does not mention survive from the global file
        assert_eq!(loaded.config.session.call_timeout_secs, Some(4));
        assert!(loaded.config.logging.json);
    }

    #[test]
    #[serial]
    fn test_local_null_removes_global_value() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let global = write(
            &temp.path().join("global"),
            GLOBAL_FILE,
            r#"{"session": {"call_timeout_secs": 4}}"#,
        );
        write(temp.path(), LOCAL_FILE, r#"{"session": {"call_timeout_secs": null}}"#);

        let loaded = load_from(&global, temp.path()).unwrap();
        assert_eq!(loaded.config.session.call_timeout_secs, None);
    }

    #[test]
    #[serial]
    fn test_env_overrides_files() {
        clear_env();
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            LOCAL_FILE,
            r#"{"session": {"timeout_secs": 12}, "logging": {"level": "info"}}"#,
        );

        // SAFETY: This test runs serially via #[serial] to avoid data races
        unsafe {
            std::env::set_var("MCP_BRIDGE_TIMEOUT_SECS", "90");
            std::env::set_var("MCP_BRIDGE_LOG_LEVEL", "debug");
            std::env::set_var("MCP_BRIDGE_LOG_JSON", "1");
            std::env::set_var("MCP_BRIDGE_AUTH_TOKEN", "  s3cret ");
        }

        let loaded = load_from(&temp.path().join("none.json"), temp.path()).unwrap();
        assert_eq!(loaded.config.session.timeout_secs, 90);
        assert_eq!(loaded.config.logging.level, "debug");
        assert!(loaded.config.logging.json);
        let token = loaded.config.session.auth_token.as_ref().unwrap();
        assert_eq!(token.expose_secret(), "s3cret");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparsable_env_is_a_warning() {
        clear_env();
        let temp = TempDir::new().unwrap();
        // SAFETY: This test runs serially via #[serial] to avoid data races
        unsafe {
            std::env::set_var("MCP_BRIDGE_CALL_TIMEOUT_SECS", "soon");
        }

        let loaded = load_from(&temp.path().join("none.json"), temp.path()).unwrap();
        assert_eq!(loaded.config.session.call_timeout_secs, None);
        assert!(
            loaded
                .warnings
                .iter()
                .any(|w| w.code == "env.unparsable" && w.path == "MCP_BRIDGE_CALL_TIMEOUT_SECS")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_trimmed_ignores_whitespace() {
        // SAFETY: This test runs serially via #[serial] to avoid data races
        unsafe {
            std::env::set_var("TEST_MCP_BRIDGE_TRIM", "  value  ");
            std::env::set_var("TEST_MCP_BRIDGE_EMPTY", "   ");
        }
        assert_eq!(env_trimmed("TEST_MCP_BRIDGE_TRIM"), Some("value".to_string()));
        assert_eq!(env_trimmed("TEST_MCP_BRIDGE_EMPTY"), None);

        // SAFETY: This test runs serially via #[serial] to avoid data races
        unsafe {
            std::env::remove_var("TEST_MCP_BRIDGE_TRIM");
            std::env::remove_var("TEST_MCP_BRIDGE_EMPTY");
        }
    }

    #[test]
    fn test_invalid_json_errors() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), LOCAL_FILE, "not valid json");

        let err = load_from(&temp.path().join("none.json"), temp.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_non_object_root_errors() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), LOCAL_FILE, "[1, 2, 3]");

        let err = load_from(&temp.path().join("none.json"), temp.path()).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }

    #[test]
    fn test_wrong_field_type_errors() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), LOCAL_FILE, r#"{"session": {"timeout_secs": "long"}}"#);

        let err = load_from(&temp.path().join("none.json"), temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to deserialize"));
    }

    #[test]
    #[serial]
    fn test_paths_are_set() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let loaded = load_merged(temp.path()).unwrap();

        assert_eq!(loaded.paths.local, temp.path().join(LOCAL_FILE));
        assert!(loaded.paths.global.ends_with("mcp-bridge/mcp-bridge.json"));
    }
}
