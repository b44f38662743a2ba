//! Discovered server surface: tools, resources and prompts by native name.

use crate::error::BridgeError;
use crate::naming::to_snake_case;
use crate::prompts::PromptHandle;
use crate::proxy::ToolProxy;
use crate::registry::ToolRegistry;
use crate::remote::{PromptSource, RemoteSession, ResourceReader};
use crate::resources::{ResourceHandle, StaticResourceCache};
use crate::sync::SyncBridge;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options applied while discovering a server.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Default per-call deadline for every discovered tool.
    pub call_timeout: Option<Duration>,
}

/// A connected server's capabilities, addressable by native names.
///
/// Tools are found by their remote name or its `snake_case` form. Resources
/// are found by URI or attribute name (`UPPER_SNAKE` for static resources).
/// Prompts are found by name or its `snake_case` form.
pub struct BridgedServer {
    name: String,
    tools: ToolRegistry,
    tool_aliases: HashMap<String, String>,
    resources: Vec<ResourceHandle>,
    prompts: Vec<PromptHandle>,
    cache: Arc<StaticResourceCache>,
}

impl std::fmt::Debug for BridgedServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgedServer")
            .field("name", &self.name)
            .field("tools", &self.tools)
            .field("resources", &self.resources.len())
            .field("prompts", &self.prompts.len())
            .finish()
    }
}

impl BridgedServer {
    /// Enumerate a session's tools, resources and prompts.
    ///
    /// Tool listing failures are errors. Resource and prompt listings are
    /// optional server features, so their failures only log a warning.
    pub async fn discover<S>(session: Arc<S>, options: &DiscoveryOptions) -> Result<Self, BridgeError>
    where
        S: RemoteSession + 'static,
    {
        let name = session.server_name().to_string();
        let specs = session
            .list_capabilities()
            .await
            .map_err(|e| e.into_bridge("tools/list"))?;

        let mut tools = ToolRegistry::new();
        for spec in &specs {
            let mut proxy = ToolProxy::from_capability(spec, Arc::<S>::clone(&session))?;
            if let Some(t) = options.call_timeout {
                proxy = proxy.with_timeout(t);
            }
            tools.register(proxy)?;
        }
        let tool_aliases = aliases(tools.list().into_iter());

        let cache = Arc::new(StaticResourceCache::new());
        let reader: Arc<dyn ResourceReader> = Arc::<S>::clone(&session);
        let resources = match session.list_resources().await {
            Ok(list) => list
                .into_iter()
                .map(|d| ResourceHandle::new(d, Arc::clone(&reader), Arc::clone(&cache)))
                .collect(),
            Err(e) => {
                warn!(server = %name, error = %e, "resource listing unavailable");
                Vec::new()
            }
        };

        let source: Arc<dyn PromptSource> = Arc::<S>::clone(&session);
        let prompts = match session.list_prompts().await {
            Ok(list) => list
                .into_iter()
                .map(|d| PromptHandle::new(d, Arc::clone(&source)))
                .collect(),
            Err(e) => {
                warn!(server = %name, error = %e, "prompt listing unavailable");
                Vec::new()
            }
        };

        info!(
            server = %name,
            tools = tools.len(),
            resources = resources.len(),
            prompts = prompts.len(),
            "discovered server capabilities"
        );
        Ok(Self {
            name,
            tools,
            tool_aliases,
            resources,
            prompts,
            cache,
        })
    }

    /// Discover from synchronous code.
    pub fn discover_blocking<S>(session: Arc<S>, options: &DiscoveryOptions) -> Result<Self, BridgeError>
    where
        S: RemoteSession + 'static,
    {
        SyncBridge::block_on(Self::discover(session, options))?
    }

    /// Name the server reported during the handshake.
    pub fn server_name(&self) -> &str {
        &self.name
    }

    /// All tools.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Look up a tool by remote name, then by `snake_case` alias.
    pub fn tool(&self, name: &str) -> Option<&ToolProxy> {
        self.tools.get(name).or_else(|| {
            self.tool_aliases
                .get(name)
                .and_then(|real| self.tools.get(real))
        })
    }

    /// Add a caller-built tool (usually one derived with a transform).
    pub fn register_tool(&mut self, proxy: ToolProxy) -> Result<(), BridgeError> {
        let alias = to_snake_case(proxy.name());
        let name = proxy.name().to_string();
        self.tools.register(proxy)?;
        if alias != name && !self.tools.contains(&alias) {
            self.tool_aliases.entry(alias).or_insert(name);
        }
        Ok(())
    }

    pub fn resources(&self) -> &[ResourceHandle] {
        &self.resources
    }

    /// Look up a resource by URI or attribute name.
    pub fn resource(&self, key: &str) -> Option<&ResourceHandle> {
        self.resources
            .iter()
            .find(|r| r.uri() == key)
            .or_else(|| {
                self.resources
                    .iter()
                    .find(|r| r.descriptor().attribute_name() == key)
            })
    }

    /// Shared cache backing static resource reads.
    pub fn resource_cache(&self) -> &Arc<StaticResourceCache> {
        &self.cache
    }

    pub fn prompts(&self) -> &[PromptHandle] {
        &self.prompts
    }

    /// Look up a prompt by name, then by `snake_case` form.
    pub fn prompt(&self, name: &str) -> Option<&PromptHandle> {
        self.prompts
            .iter()
            .find(|p| p.name() == name)
            .or_else(|| self.prompts.iter().find(|p| to_snake_case(p.name()) == name))
    }
}

/// `snake_case` alias to remote name, skipping aliases that collide with a
/// real name or with each other.
fn aliases<'a>(names: impl Iterator<Item = &'a str> + Clone) -> HashMap<String, String> {
    let mut out: HashMap<String, String> = HashMap::new();
    let mut ambiguous: Vec<String> = Vec::new();
    for name in names.clone() {
        let alias = to_snake_case(name);
        if alias == name || names.clone().any(|n| n == alias) {
            continue;
        }
        if out.insert(alias.clone(), name.to_string()).is_some() {
            ambiguous.push(alias);
        }
    }
    for alias in ambiguous {
        debug!(alias = %alias, "dropping ambiguous tool alias");
        out.remove(&alias);
    }
    out
}
