//! JSON Schema for [`BridgeConfig`], for editor validation and completion.

use crate::types::BridgeConfig;
use schemars::{Schema, generate::SchemaSettings};

pub fn schema() -> Schema {
    SchemaSettings::default()
        .into_generator()
        .into_root_schema_for::<BridgeConfig>()
}

/// The schema as a pretty-printed JSON string.
pub fn schema_json_pretty() -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&schema())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> jsonschema::Validator {
        jsonschema::validator_for(&serde_json::to_value(schema()).unwrap()).unwrap()
    }

    #[test]
    fn test_schema_is_valid_json() {
        let json = schema_json_pretty().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("properties").is_some());
    }

    #[test]
    fn test_schema_excludes_secrets() {
        let json = schema_json_pretty().unwrap();
        assert!(!json.contains("auth_token"));
    }

    #[test]
    fn test_default_config_validates_against_schema() {
        let config_json = serde_json::to_value(BridgeConfig::default()).unwrap();
        let result = validator().validate(&config_json);
        assert!(result.is_ok(), "default config rejected: {:?}", result.err());
    }

    #[test]
    fn test_partial_config_validates_against_schema() {
        let config_json = serde_json::json!({"session": {"call_timeout_secs": 20}});
        assert!(validator().validate(&config_json).is_ok());
    }

    #[test]
    fn test_wrong_type_fails_schema() {
        let config_json = serde_json::json!({"session": {"timeout_secs": "soon"}});
        assert!(validator().validate(&config_json).is_err());
    }
}
