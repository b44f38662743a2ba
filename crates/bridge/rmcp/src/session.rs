//! rmcp client session implementing the bridge's collaborator traits.

use crate::convert;
use crate::error::SessionError;
use crate::roots::RootsHandler;
use crate::transport::TransportSpec;
use mcp_bridge_core::{
    BoxFuture, CapabilitySource, CapabilitySpec, PromptDescriptor, PromptMessage, PromptSource,
    RawResult, RemoteError, RemoteInvoker, RemoteSession, ResourceContent, ResourceDescriptor,
    ResourceReader,
};
use rmcp::{
    model::{CallToolRequestParam, GetPromptRequestParam, ReadResourceRequestParam},
    service::{Peer, RoleClient, RunningService, ServiceError, ServiceExt},
    transport::{
        StreamableHttpClientTransport, child_process::TokioChildProcess,
        streamable_http_client::StreamableHttpClientTransportConfig,
    },
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json, json};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::process::Command;
use tokio::runtime::{Handle, Runtime};
use tokio::time::timeout;
use tracing::{debug, info, warn};

type Client = RunningService<RoleClient, RootsHandler>;

/// Options for establishing a session.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Limit for spawning or connecting plus the initialize handshake.
    pub timeout: Duration,
    /// Filesystem roots offered to the server, normalized on connect.
    pub roots: Vec<PathBuf>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            roots: Vec::new(),
        }
    }
}

impl ConnectOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Offer `roots` to the server. Relative paths resolve against the
    /// current directory.
    pub fn with_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(roots.into_iter().map(Into::into));
        self
    }
}

/// A live connection to one MCP server.
///
/// Every request goes through rmcp's channel-backed [`Peer`], so calls may be
/// issued from any runtime, including the short-lived ones blocking calls use.
/// Sessions opened with [`connect_blocking`](Self::connect_blocking) own a
/// driver runtime that keeps the connection alive between calls.
pub struct RmcpSession {
    name: String,
    info: Json,
    peer: Peer<RoleClient>,
    service: Mutex<Option<Client>>,
    driver: Option<Runtime>,
}

impl std::fmt::Debug for RmcpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RmcpSession")
            .field("name", &self.name)
            .field("blocking", &self.driver.is_some())
            .finish_non_exhaustive()
    }
}

impl RmcpSession {
    /// Connect and complete the initialize handshake.
    pub async fn connect(spec: &TransportSpec, options: &ConnectOptions) -> Result<Self, SessionError> {
        debug!(server = spec.label(), roots = options.roots.len(), "connecting to MCP server");
        let handler = RootsHandler::new(&options.roots)?;
        let service = match spec {
            TransportSpec::Stdio { program, args, env } => {
                let mut cmd = Command::new(program);
                cmd.args(args).envs(env).kill_on_drop(true);
                let transport = TokioChildProcess::new(cmd).map_err(|e| SessionError::Spawn {
                    command: program.clone(),
                    message: e.to_string(),
                })?;
                handshake(handler.serve(transport), options.timeout).await?
            }
            TransportSpec::Http {
                url,
                headers,
                bearer,
            } => {
                let mut config = StreamableHttpClientTransportConfig::with_uri(url.as_str());
                if let Some(token) = bearer {
                    config = config.auth_header(token.clone());
                }
                let transport = if headers.is_empty() {
                    StreamableHttpClientTransport::from_config(config)
                } else {
                    StreamableHttpClientTransport::with_client(http_client(headers)?, config)
                };
                handshake(handler.serve(transport), options.timeout).await?
            }
        };

        let info = service
            .peer_info()
            .ok_or(SessionError::MissingServerInfo)
            .map(|i| serde_json::to_value(i).unwrap_or(Json::Null))?;
        let (name, version) = convert::server_identity(&info);
        let name = name.unwrap_or_else(|| spec.label().to_string());
        info!(server = %name, version = ?version, "connected to MCP server");

        Ok(Self {
            name,
            info,
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
            driver: None,
        })
    }

    /// Connect from synchronous code.
    ///
    /// The session owns a dedicated runtime that drives the connection until
    /// the session is closed or dropped.
    pub fn connect_blocking(spec: &TransportSpec, options: &ConnectOptions) -> Result<Self, SessionError> {
        if Handle::try_current().is_ok() {
            return Err(SessionError::NestedRuntime);
        }
        let driver = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mcp-bridge-driver")
            .enable_all()
            .build()
            .map_err(|e| SessionError::Runtime(e.to_string()))?;
        let mut session = driver.block_on(Self::connect(spec, options))?;
        session.driver = Some(driver);
        Ok(session)
    }

    /// Server version reported during the handshake.
    pub fn version(&self) -> Option<String> {
        convert::server_identity(&self.info).1
    }

    /// Usage instructions the server sent during the handshake.
    pub fn instructions(&self) -> Option<&str> {
        self.info.get("instructions").and_then(Json::as_str)
    }

    /// The raw initialize result.
    pub fn server_info(&self) -> &Json {
        &self.info
    }

    /// Shut the connection down. Later requests fail with a transport error.
    pub async fn close(&self) {
        let service = self
            .service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(service) = service {
            if let Err(e) = service.cancel().await {
                warn!(server = %self.name, error = %e, "session task ended abnormally");
            }
            debug!(server = %self.name, "session closed");
        }
    }

    /// Shut down from synchronous code.
    pub fn close_blocking(&self) {
        match &self.driver {
            Some(driver) if Handle::try_current().is_err() => driver.block_on(self.close()),
            // Dropping the service cancels it on its own runtime.
            _ => drop(
                self.service
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take(),
            ),
        }
    }

    fn declares(&self, capability: &str) -> bool {
        convert::declares(&self.info, capability)
    }
}

impl Drop for RmcpSession {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.shutdown_background();
        }
    }
}

async fn handshake<F, E>(serve: F, limit: Duration) -> Result<Client, SessionError>
where
    F: Future<Output = Result<Client, E>>,
    E: std::fmt::Display,
{
    timeout(limit, serve)
        .await
        .map_err(|_| SessionError::HandshakeTimeout(limit))?
        .map_err(|e| SessionError::Handshake(e.to_string()))
}

fn http_client(headers: &BTreeMap<String, String>) -> Result<reqwest::Client, SessionError> {
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

    let mut map = HeaderMap::new();
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| SessionError::HttpClient(format!("header name '{k}': {e}")))?;
        let value = HeaderValue::from_str(v)
            .map_err(|e| SessionError::HttpClient(format!("header '{k}': {e}")))?;
        map.insert(name, value);
    }
    reqwest::Client::builder()
        .default_headers(map)
        .build()
        .map_err(|e| SessionError::HttpClient(e.to_string()))
}

/// Classify an rmcp failure.
pub(crate) fn remote_error(err: &ServiceError) -> RemoteError {
    match err {
        ServiceError::McpError(data) => RemoteError::Remote(data.message.to_string()),
        ServiceError::Timeout { timeout } => {
            RemoteError::Timeout(format!("no response within {timeout:?}"))
        }
        other => {
            let message = other.to_string();
            if is_auth_failure(&message) {
                RemoteError::Auth(message)
            } else {
                RemoteError::Transport(message)
            }
        }
    }
}

fn is_auth_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("401") || lower.contains("unauthorized") || lower.contains("auth required")
}

fn to_wire<T: Serialize>(value: &T) -> Result<Json, RemoteError> {
    serde_json::to_value(value).map_err(|e| RemoteError::Transport(format!("decoding response: {e}")))
}

fn request<T: DeserializeOwned>(value: Json) -> Result<T, RemoteError> {
    serde_json::from_value(value).map_err(|e| RemoteError::Transport(format!("encoding request: {e}")))
}

fn collect_named<T, R>(items: &[T], kind: &str, read: impl Fn(&Json) -> Option<R>) -> Result<Vec<R>, RemoteError>
where
    T: Serialize,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let wire = to_wire(item)?;
        match read(&wire) {
            Some(r) => out.push(r),
            None => warn!(kind, entry = %wire, "skipping malformed listing entry"),
        }
    }
    Ok(out)
}

impl CapabilitySource for RmcpSession {
    fn list_capabilities(&self) -> BoxFuture<'static, Result<Vec<CapabilitySpec>, RemoteError>> {
        let peer = self.peer.clone();
        let declared = self.declares("tools");
        Box::pin(async move {
            if !declared {
                return Ok(Vec::new());
            }
            let tools = peer.list_all_tools().await.map_err(|e| remote_error(&e))?;
            collect_named(&tools, "tool", convert::capability)
        })
    }
}

impl RemoteInvoker for RmcpSession {
    fn invoke(
        &self,
        name: &str,
        args: Map<String, Json>,
    ) -> BoxFuture<'static, Result<RawResult, RemoteError>> {
        let peer = self.peer.clone();
        let params = json!({"name": name, "arguments": args});
        Box::pin(async move {
            let params: CallToolRequestParam = request(params)?;
            let result = peer.call_tool(params).await.map_err(|e| remote_error(&e))?;
            Ok(RawResult::from_json(to_wire(&result)?))
        })
    }
}

impl ResourceReader for RmcpSession {
    fn list_resources(&self) -> BoxFuture<'static, Result<Vec<ResourceDescriptor>, RemoteError>> {
        let peer = self.peer.clone();
        let declared = self.declares("resources");
        Box::pin(async move {
            if !declared {
                return Ok(Vec::new());
            }
            let resources = peer.list_all_resources().await.map_err(|e| remote_error(&e))?;
            collect_named(&resources, "resource", convert::resource)
        })
    }

    fn read_resource(&self, uri: &str) -> BoxFuture<'static, Result<Vec<ResourceContent>, RemoteError>> {
        let peer = self.peer.clone();
        let params = json!({"uri": uri});
        Box::pin(async move {
            let params: ReadResourceRequestParam = request(params)?;
            let result = peer.read_resource(params).await.map_err(|e| remote_error(&e))?;
            Ok(convert::resource_contents(&to_wire(&result)?))
        })
    }
}

impl PromptSource for RmcpSession {
    fn list_prompts(&self) -> BoxFuture<'static, Result<Vec<PromptDescriptor>, RemoteError>> {
        let peer = self.peer.clone();
        let declared = self.declares("prompts");
        Box::pin(async move {
            if !declared {
                return Ok(Vec::new());
            }
            let prompts = peer.list_all_prompts().await.map_err(|e| remote_error(&e))?;
            collect_named(&prompts, "prompt", convert::prompt)
        })
    }

    fn get_prompt(
        &self,
        name: &str,
        args: Map<String, Json>,
    ) -> BoxFuture<'static, Result<Vec<PromptMessage>, RemoteError>> {
        let peer = self.peer.clone();
        let params = json!({"name": name, "arguments": args});
        Box::pin(async move {
            let params: GetPromptRequestParam = request(params)?;
            let result = peer.get_prompt(params).await.map_err(|e| remote_error(&e))?;
            Ok(convert::prompt_messages(&to_wire(&result)?))
        })
    }
}

impl RemoteSession for RmcpSession {
    fn server_name(&self) -> &str {
        &self.name
    }
}
