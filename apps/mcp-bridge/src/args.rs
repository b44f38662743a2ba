//! `key=value` argument parsing.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

/// Build an argument object from an optional JSON object and `key=value` pairs.
///
/// Values that parse as JSON are used as such (`n=3`, `tags=["a"]`,
/// `flag=true`); anything else is a string. Quote to force a string:
/// `zip='"02134"'`. Pairs override keys from `json`.
pub fn build(json: Option<&str>, pairs: &[String]) -> Result<Value> {
    let mut map = match json {
        Some(raw) => match serde_json::from_str(raw).context("--json-args is not valid JSON")? {
            Value::Object(m) => m,
            other => bail!("--json-args must be a JSON object, got {other}"),
        },
        None => Map::new(),
    };
    for pair in pairs {
        let (key, raw) = split_pair(pair)?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(key.to_string(), value);
    }
    Ok(Value::Object(map))
}

/// Like [`build`], but every pair value stays a string. Prompt arguments
/// are always strings.
pub fn build_text(pairs: &[String]) -> Result<Value> {
    let mut map = Map::new();
    for pair in pairs {
        let (key, raw) = split_pair(pair)?;
        map.insert(key.to_string(), Value::String(raw.to_string()));
    }
    Ok(Value::Object(map))
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    let (key, raw) = pair
        .split_once('=')
        .with_context(|| format!("expected key=value, got '{pair}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty argument name in '{pair}'");
    }
    Ok((key, raw))
}
