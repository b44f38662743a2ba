//! Advisory validation for [`BridgeConfig`].
//!
//! Warnings are reported, never enforced. A config with warnings still loads.

use crate::types::BridgeConfig;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// An advisory warning about a configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryWarning {
    /// Machine-readable warning code.
    pub code: &'static str,

    /// Human-readable warning message.
    pub message: String,

    /// Config path or env var the warning is about.
    pub path: &'static str,
}

impl std::fmt::Display for AdvisoryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Validate a configuration and return advisory warnings.
pub fn validate(cfg: &BridgeConfig) -> Vec<AdvisoryWarning> {
    let mut warnings = vec![];

    if cfg.session.timeout_secs == 0 {
        warnings.push(AdvisoryWarning {
            code: "session.timeout_secs.zero",
            path: "session.timeout_secs",
            message: "A zero timeout fails every connection attempt".into(),
        });
    }
    if cfg.session.call_timeout_secs == Some(0) {
        warnings.push(AdvisoryWarning {
            code: "session.call_timeout_secs.zero",
            path: "session.call_timeout_secs",
            message: "A zero call deadline times out every tool call".into(),
        });
    }
    if cfg.session.headers.keys().any(|k| k.trim().is_empty()) {
        warnings.push(AdvisoryWarning {
            code: "session.headers.empty_name",
            path: "session.headers",
            message: "Header names cannot be empty".into(),
        });
    }

    if !LOG_LEVELS.contains(&cfg.logging.level.to_lowercase().as_str()) {
        warnings.push(AdvisoryWarning {
            code: "logging.level.invalid",
            path: "logging.level",
            message: format!(
                "Unknown log level '{}'. Expected one of: {}",
                cfg.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    warnings
}
