//! Tool registry for lookup and dynamic dispatch.

use crate::context::CallContext;
use crate::error::BridgeError;
use crate::hydrate::Hydrated;
use crate::proxy::ToolProxy;
use crate::tool::Capability;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Named collection of tool proxies, in registration order.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    order: Vec<String>,
    map: HashMap<String, ToolProxy>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.order).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a proxy under its visible name.
    ///
    /// Fails with [`BridgeError::DuplicateTool`] if the name is taken.
    pub fn register(&mut self, proxy: ToolProxy) -> Result<(), BridgeError> {
        let name = proxy.name().to_string();
        if self.map.contains_key(&name) {
            return Err(BridgeError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.map.insert(name, proxy);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolProxy> {
        self.map.get(name)
    }

    /// Tool names in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Proxies in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolProxy> {
        self.order.iter().filter_map(|n| self.map.get(n))
    }

    /// Erased capabilities for agent frameworks, in registration order.
    pub fn to_list(&self) -> Vec<Arc<dyn Capability>> {
        self.iter()
            .map(|p| Arc::new(p.clone()) as Arc<dyn Capability>)
            .collect()
    }

    /// Create a subset registry containing only the specified tools.
    ///
    /// Tools not found in the registry are silently ignored.
    pub fn subset<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> ToolRegistry {
        let allowed: HashSet<&str> = names.into_iter().collect();
        let mut out = ToolRegistry::new();
        for name in &self.order {
            if allowed.contains(name.as_str())
                && let Some(proxy) = self.map.get(name)
            {
                out.order.push(name.clone());
                out.map.insert(name.clone(), proxy.clone());
            }
        }
        out
    }

    /// Dispatch a call by tool name.
    pub async fn call(
        &self,
        name: &str,
        args: Value,
        ctx: &CallContext,
    ) -> Result<Hydrated, BridgeError> {
        let proxy = self
            .map
            .get(name)
            .ok_or_else(|| BridgeError::not_found(format!("tool '{name}'")))?;
        proxy.call_with(args, ctx).await
    }

    /// Check if a tool is registered by name.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<'a> IntoIterator for &'a ToolRegistry {
    type Item = &'a ToolProxy;
    type IntoIter = Box<dyn Iterator<Item = &'a ToolProxy> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::CapabilitySpec;
    use crate::hydrate::RawResult;
    use crate::remote::{RemoteError, RemoteInvoker};
    use futures::future::BoxFuture;
    use serde_json::{Map, json};

    struct Echo;

    impl RemoteInvoker for Echo {
        fn invoke(
            &self,
            _name: &str,
            args: Map<String, Value>,
        ) -> BoxFuture<'static, Result<RawResult, RemoteError>> {
            Box::pin(async move { Ok(RawResult::structured(Value::Object(args))) })
        }
    }

    fn proxy(name: &str) -> ToolProxy {
        ToolProxy::from_capability(
            &CapabilitySpec::new(name, json!({"type": "object"})),
            Arc::new(Echo),
        )
        .unwrap()
    }

    #[test]
    fn test_registry_register_and_list() {
        let mut registry = ToolRegistry::new();
        registry.register(proxy("b_tool")).unwrap();
        registry.register(proxy("a_tool")).unwrap();

        assert!(registry.contains("a_tool"));
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert_eq!(registry.list(), vec!["b_tool", "a_tool"]);
        assert_eq!(registry.to_list().len(), 2);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ToolRegistry::new();
        registry.register(proxy("t")).unwrap();
        let err = registry.register(proxy("t")).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateTool(n) if n == "t"));
    }

    #[test]
    fn test_subset() {
        let mut registry = ToolRegistry::new();
        for n in ["one", "two", "three"] {
            registry.register(proxy(n)).unwrap();
        }
        let sub = registry.subset(["three", "one", "missing"]);
        assert_eq!(sub.list(), vec!["one", "three"]);
    }

    #[tokio::test]
    async fn test_call_unknown_is_not_found() {
        let registry = ToolRegistry::new();
        let err = registry
            .call("nope", json!({}), &CallContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_call_dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(proxy("echo")).unwrap();
        let out = registry
            .call("echo", json!({}), &CallContext::default())
            .await
            .unwrap();
        assert_eq!(out, Hydrated::Structured(json!({})));
    }
}
