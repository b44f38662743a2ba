//! Uniform capability trait for dynamic dispatch.

use crate::context::CallContext;
use crate::descriptor::ToolDescriptor;
use crate::error::BridgeError;
use crate::hydrate::Hydrated;
use futures::future::BoxFuture;
use serde_json::Value;

/// A callable capability with a native description.
///
/// [`ToolProxy`](crate::ToolProxy) is the implementation for remote tools;
/// registries and provider renderers work against this trait so callers can
/// mix in their own capabilities.
pub trait Capability: Send + Sync {
    /// Native description (name, arguments, output type).
    fn describe(&self) -> &ToolDescriptor;

    /// Call with JSON arguments (an object, or `null` for none).
    fn call_json(
        &self,
        args: Value,
        ctx: &CallContext,
    ) -> BoxFuture<'static, Result<Hydrated, BridgeError>>;

    /// Capability name.
    fn name(&self) -> &str {
        self.describe().name()
    }
}
