//! Unified error types for the bridge.

use std::fmt;
use thiserror::Error;

/// A schema fragment that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed schema at {path}: {message}")]
pub struct SchemaError {
    /// Location of the offending node, `/`-separated from the fragment root.
    pub path: String,
    /// What was wrong with it.
    pub message: String,
}

impl SchemaError {
    pub(crate) fn at(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: if path.is_empty() { "/".into() } else { path.to_string() },
            message: message.into(),
        }
    }
}

/// One offending argument found while validating a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentIssue {
    /// Visible argument name the issue belongs to.
    pub argument: String,
    /// Human-readable problem description.
    pub problem: String,
}

impl ArgumentIssue {
    pub fn new(argument: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            argument: argument.into(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for ArgumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.argument, self.problem)
    }
}

/// Caller-supplied arguments violated required/type constraints.
///
/// Carries every offending argument, never just the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed for '{capability}': {}", format_issues(.issues))]
pub struct ValidationError {
    pub capability: String,
    pub issues: Vec<ArgumentIssue>,
}

impl ValidationError {
    /// Names of the offending arguments, deduplicated, in report order.
    pub fn argument_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for issue in &self.issues {
            if !names.contains(&issue.argument.as_str()) {
                names.push(issue.argument.as_str());
            }
        }
        names
    }
}

fn format_issues(issues: &[ArgumentIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An argument transform violated its construction-time invariants, or could
/// not be bound to the tool it was applied to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("hide=true requires a default or a default factory")]
    HiddenWithoutDefault,

    #[error("a default factory requires hide=true")]
    FactoryWithoutHide,

    #[error("default and default factory are mutually exclusive")]
    ConflictingDefaults,

    #[error("required=true conflicts with a supplied default")]
    RequiredWithDefault,

    #[error("a hidden argument cannot be required")]
    HiddenRequired,

    #[error("new name must not be empty")]
    EmptyName,

    #[error("tool '{tool}' has no visible argument named '{argument}'")]
    UnknownArgument { tool: String, argument: String },

    #[error("tool '{tool}' would expose argument '{argument}' more than once")]
    DuplicateArgument { tool: String, argument: String },
}

/// Misuse of the blocking call surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error(
        "blocking call issued from inside an async runtime; use the async surface instead"
    )]
    NestedRuntime,

    #[error("failed to start an isolated runtime: {0}")]
    RuntimeStart(String),
}

/// Error type returned by bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid transform: {0}")]
    Transform(#[from] TransformError),

    /// The remote call failed.
    #[error("'{capability}' failed: {cause}")]
    Invocation {
        capability: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The payload carried nothing that could be hydrated.
    #[error("cannot hydrate result of '{capability}': {message}")]
    Hydration { capability: String, message: String },

    /// The remote call exceeded its deadline.
    #[error("'{capability}' timed out")]
    Timeout { capability: String },

    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Lookup of an unknown capability through a dispatching surface.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("a tool named '{0}' is already registered")]
    DuplicateTool(String),
}

impl BridgeError {
    /// Create an invocation error wrapping any underlying cause.
    pub fn invocation<E>(capability: impl Into<String>, cause: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        BridgeError::Invocation {
            capability: capability.into(),
            cause: cause.into(),
        }
    }

    /// Create a hydration error.
    pub fn hydration(capability: impl Into<String>, message: impl Into<String>) -> Self {
        BridgeError::Hydration {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(capability: impl Into<String>) -> Self {
        BridgeError::Timeout {
            capability: capability.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found<S: ToString>(s: S) -> Self {
        BridgeError::NotFound(s.to_string())
    }

    /// Name of the capability the error is attributed to, when there is one.
    pub fn capability(&self) -> Option<&str> {
        match self {
            BridgeError::Validation(v) => Some(&v.capability),
            BridgeError::Invocation { capability, .. }
            | BridgeError::Hydration { capability, .. }
            | BridgeError::Timeout { capability } => Some(capability),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_issue() {
        let err = ValidationError {
            capability: "add".into(),
            issues: vec![
                ArgumentIssue::new("a", "missing required argument"),
                ArgumentIssue::new("b", "expected integer, got string"),
                ArgumentIssue::new("b", "second problem"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("a: missing required argument"));
        assert!(msg.contains("b: expected integer, got string"));
        assert_eq!(err.argument_names(), vec!["a", "b"]);
    }

    #[test]
    fn invocation_error_keeps_capability_and_cause() {
        let err = BridgeError::invocation("search", "connection reset");
        assert_eq!(err.capability(), Some("search"));
        assert_eq!(err.to_string(), "'search' failed: connection reset");
    }

    #[test]
    fn schema_error_root_path() {
        let err = SchemaError::at("", "bad");
        assert_eq!(err.path, "/");
    }
}
