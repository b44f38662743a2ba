//! Typed proxies for remote tools.

use crate::context::CallContext;
use crate::descriptor::{CapabilitySpec, ToolDescriptor};
use crate::error::{ArgumentIssue, BridgeError, ValidationError};
use crate::hydrate::{Hydrated, hydrate};
use crate::remote::{RemoteError, RemoteInvoker};
use crate::schema::{TypeDescriptor, TypeKind, json_kind};
use crate::sync::SyncBridge;
use crate::tool::Capability;
use crate::transform::{self, Binding, ToolTransform};
use crate::validate;
use futures::future::BoxFuture;
use serde_json::{Map, Value as Json};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Callable native stand-in for one remote tool.
///
/// Cheap to clone. A proxy derived with [`ToolProxy::derive`] keeps its parent
/// alive and invokes the same remote tool through a rewritten argument binding.
#[derive(Clone)]
pub struct ToolProxy {
    state: Arc<ProxyState>,
}

struct ProxyState {
    descriptor: ToolDescriptor,
    remote_name: String,
    binding: Binding,
    invoker: Arc<dyn RemoteInvoker>,
    parent: Option<ToolProxy>,
    timeout: Option<Duration>,
}

impl fmt::Debug for ToolProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolProxy")
            .field("name", &self.state.descriptor.name())
            .field("remote_name", &self.state.remote_name)
            .field("timeout", &self.state.timeout)
            .field("derived", &self.state.parent.is_some())
            .finish()
    }
}

impl ToolProxy {
    /// Proxy for a remote tool whose remote name is `descriptor.name()`.
    pub fn new(descriptor: ToolDescriptor, invoker: Arc<dyn RemoteInvoker>) -> Self {
        let binding = Binding::identity(&descriptor);
        Self {
            state: Arc::new(ProxyState {
                remote_name: descriptor.name().to_string(),
                descriptor,
                binding,
                invoker,
                parent: None,
                timeout: None,
            }),
        }
    }

    /// Build from a server-advertised capability.
    pub fn from_capability(
        spec: &CapabilitySpec,
        invoker: Arc<dyn RemoteInvoker>,
    ) -> Result<Self, BridgeError> {
        Ok(Self::new(ToolDescriptor::from_capability(spec)?, invoker))
    }

    /// Visible name.
    pub fn name(&self) -> &str {
        self.state.descriptor.name()
    }

    /// Name the remote server knows this tool by.
    pub fn remote_name(&self) -> &str {
        &self.state.remote_name
    }

    pub fn description(&self) -> Option<&str> {
        self.state.descriptor.description()
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.state.descriptor
    }

    pub fn input_schema(&self) -> Json {
        self.state.descriptor.input_schema()
    }

    pub fn output_schema(&self) -> Option<Json> {
        self.state.descriptor.output_schema()
    }

    /// The proxy this one was derived from.
    pub fn parent(&self) -> Option<&ToolProxy> {
        self.state.parent.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.state.timeout
    }

    /// Copy of this proxy with a default per-call deadline.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            state: Arc::new(ProxyState {
                descriptor: self.state.descriptor.clone(),
                remote_name: self.state.remote_name.clone(),
                binding: self.state.binding.clone(),
                invoker: Arc::clone(&self.state.invoker),
                parent: self.state.parent.clone(),
                timeout: Some(timeout),
            }),
        }
    }

    /// Derive a new proxy by applying `transform` to this one's visible interface.
    pub fn derive(&self, transform: &ToolTransform) -> Result<ToolProxy, BridgeError> {
        let (descriptor, binding) =
            transform::apply(&self.state.descriptor, &self.state.binding, transform)?;
        debug!(
            parent = %self.name(),
            tool = %descriptor.name(),
            "derived transformed tool"
        );
        Ok(Self {
            state: Arc::new(ProxyState {
                descriptor,
                remote_name: self.state.remote_name.clone(),
                binding,
                invoker: Arc::clone(&self.state.invoker),
                parent: Some(self.clone()),
                timeout: self.state.timeout,
            }),
        })
    }

    /// Validate caller arguments and map them to wire arguments.
    pub fn prepare(&self, args: Json) -> Result<Map<String, Json>, ValidationError> {
        let descriptor = &self.state.descriptor;
        let invalid = |issues: Vec<ArgumentIssue>| ValidationError {
            capability: descriptor.name().to_string(),
            issues,
        };
        let map = match args {
            Json::Null => Map::new(),
            Json::Object(m) => m,
            other => {
                return Err(invalid(vec![ArgumentIssue::new(
                    "<arguments>",
                    format!("expected an object, got {}", json_kind(&other)),
                )]));
            }
        };

        if descriptor.is_open() {
            return match validate::coerce(&descriptor.input_type(), &Json::Object(map)) {
                Ok(Json::Object(m)) => Ok(self.state.binding.resolve(m)),
                Ok(_) => Ok(Map::new()),
                Err(problems) => Err(invalid(
                    problems
                        .into_iter()
                        .map(|p| ArgumentIssue::new("<arguments>", p))
                        .collect(),
                )),
            };
        }

        let mut issues = Vec::new();
        for arg in descriptor.required_arguments() {
            if !map.contains_key(&arg.name) {
                issues.push(ArgumentIssue::new(&arg.name, "missing required argument"));
            }
        }

        let mut visible = Map::new();
        for (key, value) in map {
            let Some(arg) = descriptor.argument(&key) else {
                issues.push(ArgumentIssue::new(&key, "unknown argument"));
                continue;
            };
            // An explicit null for an optional, non-nullable argument means "omitted".
            if value.is_null() && !arg.required && !accepts_null(&arg.ty) {
                continue;
            }
            match validate::coerce(&arg.ty, &value) {
                Ok(coerced) => {
                    visible.insert(key, coerced);
                }
                Err(problems) => {
                    issues.extend(problems.into_iter().map(|p| ArgumentIssue::new(&key, p)));
                }
            }
        }

        if !issues.is_empty() {
            return Err(invalid(issues));
        }
        Ok(self.state.binding.resolve(visible))
    }

    /// Invoke asynchronously.
    pub fn call_async(&self, args: Json) -> BoxFuture<'static, Result<Hydrated, BridgeError>> {
        self.call_with(args, &CallContext::default())
    }

    /// Invoke asynchronously with per-call options.
    ///
    /// A deadline (from `ctx` or the proxy) is enforced with the tokio timer,
    /// so the returned future must be polled inside a tokio runtime when one
    /// is set.
    pub fn call_with(
        &self,
        args: Json,
        ctx: &CallContext,
    ) -> BoxFuture<'static, Result<Hydrated, BridgeError>> {
        let prepared = self.prepare(args);
        let state = Arc::clone(&self.state);
        let deadline = ctx.timeout.or(state.timeout);
        Box::pin(async move {
            let wire_args = prepared?;
            let name = state.descriptor.name();
            debug!(
                tool = %name,
                remote = %state.remote_name,
                args = wire_args.len(),
                "invoking remote tool"
            );
            let started = Instant::now();
            let fut = state.invoker.invoke(&state.remote_name, wire_args);
            let outcome = match deadline {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(r) => r,
                    Err(_) => {
                        warn!(tool = %name, timeout = ?limit, "remote tool timed out");
                        return Err(BridgeError::timeout(name));
                    }
                },
                None => fut.await,
            };
            let raw = outcome.map_err(|e| {
                warn!(tool = %name, error = %e, "remote tool failed");
                e.into_bridge(name)
            })?;
            debug!(
                tool = %name,
                elapsed = ?started.elapsed(),
                is_error = raw.is_error(),
                "remote tool returned"
            );
            if raw.is_error() {
                return Err(BridgeError::invocation(
                    name,
                    RemoteError::Remote(raw.error_text()),
                ));
            }
            hydrate(name, &raw, state.descriptor.output())
        })
    }

    /// Invoke from synchronous code.
    ///
    /// Fails with [`UsageError::NestedRuntime`](crate::UsageError::NestedRuntime)
    /// when called from inside an async runtime.
    pub fn call(&self, args: Json) -> Result<Hydrated, BridgeError> {
        SyncBridge::block_on(self.call_async(args))?
    }
}

impl Capability for ToolProxy {
    fn describe(&self) -> &ToolDescriptor {
        &self.state.descriptor
    }

    fn call_json(
        &self,
        args: Json,
        ctx: &CallContext,
    ) -> BoxFuture<'static, Result<Hydrated, BridgeError>> {
        self.call_with(args, ctx)
    }
}

fn accepts_null(ty: &TypeDescriptor) -> bool {
    match &ty.kind {
        TypeKind::Nullable { .. } | TypeKind::Opaque(_) => true,
        TypeKind::Enum { values, .. } => values.contains(&Json::Null),
        _ => false,
    }
}
