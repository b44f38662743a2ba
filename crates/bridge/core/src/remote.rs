//! Seams to the transport layer.
//!
//! The bridge never speaks a wire protocol itself. A session implementation
//! (see the `mcp-bridge-rmcp` crate) provides these traits; tests provide
//! in-memory fakes.

use crate::descriptor::CapabilitySpec;
use crate::error::BridgeError;
use crate::hydrate::RawResult;
use crate::prompts::{PromptDescriptor, PromptMessage};
use crate::resources::{ResourceContent, ResourceDescriptor};
use futures::future::BoxFuture;
use serde_json::{Map, Value as Json};
use thiserror::Error;

/// Failure reported by a transport collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    /// The remote side or the transport gave up waiting.
    #[error("deadline exceeded: {0}")]
    Timeout(String),

    /// The server answered with an error.
    #[error("remote error: {0}")]
    Remote(String),
}

impl RemoteError {
    /// Attribute this failure to `capability`.
    pub fn into_bridge(self, capability: &str) -> BridgeError {
        match self {
            RemoteError::Timeout(_) => BridgeError::timeout(capability),
            other => BridgeError::invocation(capability, other),
        }
    }
}

/// Lists the tools a server advertises.
pub trait CapabilitySource: Send + Sync {
    fn list_capabilities(&self) -> BoxFuture<'static, Result<Vec<CapabilitySpec>, RemoteError>>;
}

/// Invokes a tool by its remote name.
pub trait RemoteInvoker: Send + Sync {
    fn invoke(
        &self,
        name: &str,
        args: Map<String, Json>,
    ) -> BoxFuture<'static, Result<RawResult, RemoteError>>;
}

/// Lists and reads resources.
pub trait ResourceReader: Send + Sync {
    fn list_resources(&self) -> BoxFuture<'static, Result<Vec<ResourceDescriptor>, RemoteError>>;

    fn read_resource(&self, uri: &str)
    -> BoxFuture<'static, Result<Vec<ResourceContent>, RemoteError>>;
}

/// Lists and renders prompts.
pub trait PromptSource: Send + Sync {
    fn list_prompts(&self) -> BoxFuture<'static, Result<Vec<PromptDescriptor>, RemoteError>>;

    fn get_prompt(
        &self,
        name: &str,
        args: Map<String, Json>,
    ) -> BoxFuture<'static, Result<Vec<PromptMessage>, RemoteError>>;
}

/// A connected server session providing every collaborator.
pub trait RemoteSession: CapabilitySource + RemoteInvoker + ResourceReader + PromptSource {
    /// Name the server reported during the handshake.
    fn server_name(&self) -> &str;
}
