//! Core types for bridging MCP server capabilities into native calls.
//!
//! This crate provides:
//! - [`TypeDescriptor`]: schema fragments parsed to native type trees and rendered back
//! - [`ToolProxy`]: validated, typed calls to one remote tool, sync or async
//! - [`ToolTransform`] / [`ArgTransform`]: derive tools with renamed, hidden or defaulted arguments
//! - [`hydrate()`]: remote payloads turned into native values
//! - [`ToolRegistry`] and [`BridgedServer`]: discovery and lookup by native name
//! - [`SyncBridge`]: isolated blocking execution of async operations
//! - Provider renderers: OpenAI, Anthropic, and MCP tool definitions
//!
//! Transports plug in through the traits in [`remote`].

pub mod context;
pub mod descriptor;
pub mod error;
pub mod fmt;
pub mod hydrate;
pub mod naming;
pub mod prompts;
pub mod providers;
pub mod proxy;
pub mod registry;
pub mod remote;
pub mod resources;
pub mod schema;
pub mod server;
pub mod sync;
pub mod tool;
pub mod transform;
pub mod validate;

pub use context::CallContext;
pub use descriptor::{ArgumentDescriptor, CapabilitySpec, ToolDescriptor};
pub use error::{
    ArgumentIssue, BridgeError, SchemaError, TransformError, UsageError, ValidationError,
};
pub use fmt::{TextFormat, TextOptions, TextStyle, fallback_text_from_json};
pub use hydrate::{ContentBlock, Hydrated, RawResult, ResultEnvelope, hydrate};
pub use prompts::{PromptArgument, PromptDescriptor, PromptHandle, PromptMessage};
pub use proxy::ToolProxy;
pub use registry::ToolRegistry;
pub use remote::{
    CapabilitySource, PromptSource, RemoteError, RemoteInvoker, RemoteSession, ResourceReader,
};
pub use resources::{ResourceContent, ResourceDescriptor, ResourceHandle, StaticResourceCache};
pub use schema::{NullableStyle, ObjectType, Primitive, TypeDescriptor, TypeKind};
pub use server::{BridgedServer, DiscoveryOptions};
pub use sync::SyncBridge;
pub use tool::Capability;
pub use transform::{ArgTransform, ArgTransformBuilder, DefaultFactory, ToolTransform};

// Re-export BoxFuture so collaborator impls need not depend on futures directly
pub use futures::future::BoxFuture;
