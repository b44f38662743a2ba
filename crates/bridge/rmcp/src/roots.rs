//! Filesystem roots advertised to servers.
//!
//! Filesystem servers use roots to decide which directories they may touch.
//! Paths are made absolute (and symlinks resolved where the path exists)
//! before being sent as `file://` URIs.

use crate::error::SessionError;
use rmcp::{
    ClientHandler, ErrorData,
    model::{ClientInfo, ListRootsResult, RootsCapabilities},
    service::{RequestContext, RoleClient},
};
use serde_json::json;
use std::future::Future;
use std::path::{Path, PathBuf};
use url::Url;

/// Resolve each root to an absolute path.
///
/// Existing paths are canonicalized; missing ones are made absolute against
/// the current directory.
pub fn normalize_roots<I, P>(roots: I) -> Result<Vec<PathBuf>, SessionError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    roots
        .into_iter()
        .map(|root| {
            let root = root.as_ref();
            std::fs::canonicalize(root)
                .or_else(|_| std::path::absolute(root))
                .map_err(|e| SessionError::Roots(format!("{}: {e}", root.display())))
        })
        .collect()
}

/// Client-side handler answering `roots/list`.
#[derive(Debug, Clone)]
pub struct RootsHandler {
    listing: ListRootsResult,
    advertise: bool,
}

impl RootsHandler {
    /// Handler for `roots`; an empty list advertises no roots capability.
    pub fn new(roots: &[PathBuf]) -> Result<Self, SessionError> {
        let mut entries = Vec::with_capacity(roots.len());
        for path in normalize_roots(roots)? {
            let uri = Url::from_file_path(&path)
                .map_err(|()| SessionError::Roots(format!("{}: not a file path", path.display())))?;
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            entries.push(json!({"uri": uri.as_str(), "name": name}));
        }
        let listing = serde_json::from_value(json!({"roots": entries}))
            .map_err(|e| SessionError::Roots(e.to_string()))?;
        Ok(Self {
            listing,
            advertise: !roots.is_empty(),
        })
    }

    /// The listing sent in answer to `roots/list`.
    pub fn listing(&self) -> &ListRootsResult {
        &self.listing
    }
}

impl ClientHandler for RootsHandler {
    fn get_info(&self) -> ClientInfo {
        let mut info = ClientInfo::default();
        if self.advertise {
            info.capabilities.roots = Some(RootsCapabilities::default());
        }
        info
    }

    fn list_roots(
        &self,
        _context: RequestContext<RoleClient>,
    ) -> impl Future<Output = Result<ListRootsResult, ErrorData>> + Send + '_ {
        std::future::ready(Ok(self.listing.clone()))
    }
}
