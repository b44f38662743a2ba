//! Server target detection.
//!
//! A target string picks its transport by shape:
//! - `http://` or `https://` URLs use streamable HTTP
//! - `npx [flags] <package> [args..]` runs the package with `npx -y`
//! - anything else is split on whitespace and spawned as a stdio command

use crate::error::SessionError;
use std::collections::BTreeMap;

/// How to reach one MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSpec {
    /// Child process speaking MCP on stdin/stdout.
    Stdio {
        program: String,
        args: Vec<String>,
        env: BTreeMap<String, String>,
    },
    /// Streamable HTTP endpoint.
    Http {
        url: String,
        headers: BTreeMap<String, String>,
        /// Sent as `Authorization: Bearer <token>`.
        bearer: Option<String>,
    },
}

impl TransportSpec {
    /// Pick a transport for `target`.
    pub fn detect(target: &str) -> Result<Self, SessionError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(SessionError::EmptyTarget);
        }
        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(Self::Http {
                url: target.to_string(),
                headers: BTreeMap::new(),
                bearer: None,
            });
        }

        let mut parts = target.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(SessionError::EmptyTarget)?;
        let rest: Vec<String> = parts.collect();

        if program == "npx" {
            // User flags are dropped; the package always runs non-interactively.
            let mut tail = rest.into_iter().skip_while(|p| p.starts_with('-'));
            let package = tail
                .next()
                .ok_or_else(|| SessionError::MissingPackage(target.to_string()))?;
            let mut args = vec!["-y".to_string(), package];
            args.extend(tail);
            return Ok(Self::Stdio {
                program,
                args,
                env: BTreeMap::new(),
            });
        }

        Ok(Self::Stdio {
            program,
            args: rest,
            env: BTreeMap::new(),
        })
    }

    /// Add an HTTP header. Ignored for stdio targets.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Http { headers, .. } = &mut self {
            headers.insert(name.into(), value.into());
        }
        self
    }

    /// Add several HTTP headers. Ignored for stdio targets.
    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |spec, (k, v)| spec.with_header(k, v))
    }

    /// Authenticate HTTP requests with a bearer token. Ignored for stdio targets.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        if let Self::Http { bearer, .. } = &mut self {
            *bearer = Some(token.into());
        }
        self
    }

    /// Set an environment variable for the child. Ignored for HTTP targets.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Stdio { env, .. } = &mut self {
            env.insert(key.into(), value.into());
        }
        self
    }

    /// Short label for logs: the URL, the npx package, or the program.
    pub fn label(&self) -> &str {
        match self {
            Self::Http { url, .. } => url,
            Self::Stdio { program, args, .. } if program == "npx" => {
                args.get(1).map_or(program.as_str(), String::as_str)
            }
            Self::Stdio { program, .. } => program,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stdio(spec: &TransportSpec) -> (&str, Vec<&str>) {
        match spec {
            TransportSpec::Stdio { program, args, .. } => {
                (program.as_str(), args.iter().map(String::as_str).collect())
            }
            TransportSpec::Http { .. } => panic!("expected stdio, got {spec:?}"),
        }
    }

    #[test]
    fn urls_use_http() {
        let spec = TransportSpec::detect("https://example.com/mcp").unwrap();
        assert!(spec.is_http());
        assert_eq!(spec.label(), "https://example.com/mcp");
        assert!(TransportSpec::detect("http://localhost:8000/mcp").unwrap().is_http());
    }

    #[test]
    fn npx_skips_flags_and_forces_yes() {
        let spec = TransportSpec::detect("npx --yes -q @scope/server-files /tmp /var").unwrap();
        assert_eq!(
            stdio(&spec),
            ("npx", vec!["-y", "@scope/server-files", "/tmp", "/var"])
        );
        assert_eq!(spec.label(), "@scope/server-files");
    }

    #[test]
    fn npx_without_package_is_an_error() {
        assert!(matches!(
            TransportSpec::detect("npx -y"),
            Err(SessionError::MissingPackage(_))
        ));
    }

    #[test]
    fn other_commands_split_on_whitespace() {
        let spec = TransportSpec::detect("  python  server.py --port 3 ").unwrap();
        assert_eq!(stdio(&spec), ("python", vec!["server.py", "--port", "3"]));

        let spec = TransportSpec::detect("uvx weather-mcp").unwrap();
        assert_eq!(stdio(&spec), ("uvx", vec!["weather-mcp"]));
    }

    #[test]
    fn empty_target_is_rejected() {
        assert!(matches!(
            TransportSpec::detect("   "),
            Err(SessionError::EmptyTarget)
        ));
    }

    #[test]
    fn http_options_only_touch_http() {
        let spec = TransportSpec::detect("https://x.dev/mcp")
            .unwrap()
            .with_header("X-Team", "core")
            .with_bearer("tok")
            .with_env("IGNORED", "1");
        match spec {
            TransportSpec::Http { headers, bearer, .. } => {
                assert_eq!(headers.get("X-Team").map(String::as_str), Some("core"));
                assert_eq!(bearer.as_deref(), Some("tok"));
            }
            other => panic!("expected http, got {other:?}"),
        }

        let spec = TransportSpec::detect("server").unwrap().with_bearer("tok");
        assert_eq!(
            spec,
            TransportSpec::Stdio {
                program: "server".into(),
                args: vec![],
                env: BTreeMap::new(),
            }
        );
    }
}
