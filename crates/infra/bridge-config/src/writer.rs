//! Atomic config file writing.

use crate::loader::local_config_path;
use crate::types::BridgeConfig;
use anyhow::{Context, Result};
use atomicwrites::{AllowOverwrite, AtomicFile};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a JSON value to `path` atomically with pretty formatting,
/// creating parent directories as needed.
pub fn write_pretty_json_atomic(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value).context("Failed to serialize config to JSON")?;

    let af = AtomicFile::new(path, AllowOverwrite);
    af.write(|f| f.write_all(json.as_bytes()))
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}

/// Write a default `mcp-bridge.json` into `local_dir`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_local(local_dir: &Path, force: bool) -> Result<PathBuf> {
    let path = local_config_path(local_dir);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let value = serde_json::to_value(BridgeConfig::default())
        .context("Failed to serialize default config")?;
    write_pretty_json_atomic(&path, &value)?;
    Ok(path)
}
