//! Resource handles with at-most-once reads for static resources.

use crate::error::BridgeError;
use crate::naming::{to_constant_case, to_snake_case};
use crate::remote::{RemoteError, ResourceReader};
use crate::sync::SyncBridge;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;
use tracing::debug;

/// URI schemes whose contents change between reads.
const DYNAMIC_SCHEMES: [&str; 2] = ["dynamic://", "live://"];

/// A resource as advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub mime_type: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: None,
            description: None,
            mime_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Static resources are read once and cached; dynamic ones are re-read.
    pub fn is_static(&self) -> bool {
        !DYNAMIC_SCHEMES.iter().any(|s| self.uri.starts_with(s))
    }

    /// Declared name, else the last URI path segment.
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(n) if !n.is_empty() => n.as_str(),
            _ => self.uri.rsplit('/').next().unwrap_or(&self.uri),
        }
    }

    /// Lookup name: `UPPER_SNAKE` for static resources, `snake_case` otherwise.
    pub fn attribute_name(&self) -> String {
        if self.is_static() {
            to_constant_case(self.display_name())
        } else {
            to_snake_case(self.display_name())
        }
    }
}

/// One item of a resource read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceContent {
    Text {
        uri: String,
        mime_type: Option<String>,
        text: String,
    },
    /// Base64-encoded binary contents.
    Blob {
        uri: String,
        mime_type: Option<String>,
        blob: String,
    },
}

impl ResourceContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResourceContent::Text { text, .. } => Some(text),
            ResourceContent::Blob { .. } => None,
        }
    }
}

type Contents = Arc<Vec<ResourceContent>>;

/// Per-URI cache of static resource contents.
///
/// Concurrent first reads of a URI share one fetch. A failed fetch is not
/// cached, so the next read tries again.
#[derive(Default)]
pub struct StaticResourceCache {
    cells: Mutex<HashMap<String, Arc<OnceCell<Contents>>>>,
}

impl StaticResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return cached contents for `uri`, fetching them if not yet present.
    pub async fn get_or_fetch<F, Fut>(&self, uri: &str, fetch: F) -> Result<Contents, RemoteError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ResourceContent>, RemoteError>>,
    {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(uri.to_string()).or_default())
        };
        let contents = cell
            .get_or_try_init(|| async move {
                debug!(uri, "fetching static resource");
                fetch().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(contents))
    }

    /// Whether `uri` has cached contents.
    pub fn is_cached(&self, uri: &str) -> bool {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(uri).is_some_and(|c| c.initialized())
    }

    /// Drop the cached contents for `uri`.
    pub fn invalidate(&self, uri: &str) {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.remove(uri);
    }
}

/// Readable handle for one resource.
#[derive(Clone)]
pub struct ResourceHandle {
    descriptor: ResourceDescriptor,
    reader: Arc<dyn ResourceReader>,
    cache: Arc<StaticResourceCache>,
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl ResourceHandle {
    pub fn new(
        descriptor: ResourceDescriptor,
        reader: Arc<dyn ResourceReader>,
        cache: Arc<StaticResourceCache>,
    ) -> Self {
        Self {
            descriptor,
            reader,
            cache,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn uri(&self) -> &str {
        &self.descriptor.uri
    }

    /// Read the resource. Static resources hit the server at most once.
    pub fn read_async(&self) -> BoxFuture<'static, Result<Vec<ResourceContent>, BridgeError>> {
        let handle = self.clone();
        Box::pin(async move {
            let uri = handle.descriptor.uri.clone();
            let result = if handle.descriptor.is_static() {
                let reader = Arc::clone(&handle.reader);
                let fetch_uri = uri.clone();
                handle
                    .cache
                    .get_or_fetch(&uri, move || reader.read_resource(&fetch_uri))
                    .await
                    .map(|c| c.as_ref().clone())
            } else {
                handle.reader.read_resource(&uri).await
            };
            result.map_err(|e| e.into_bridge(&uri))
        })
    }

    /// Read from synchronous code.
    pub fn read(&self) -> Result<Vec<ResourceContent>, BridgeError> {
        SyncBridge::block_on(self.read_async())?
    }

    /// Read and join the text items.
    pub async fn read_text(&self) -> Result<String, BridgeError> {
        let contents = self.read_async().await?;
        Ok(contents
            .iter()
            .filter_map(ResourceContent::as_text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
