//! Blocking access to async operations.

use crate::error::UsageError;
use std::future::Future;
use tokio::runtime::{Builder, Handle};

/// Runs futures to completion from synchronous code.
///
/// Every call gets its own current-thread runtime, so two blocking calls never
/// share scheduler state and nothing leaks between them.
pub struct SyncBridge;

impl SyncBridge {
    /// Drive `fut` to completion on a fresh isolated runtime.
    ///
    /// Returns [`UsageError::NestedRuntime`] when the calling thread is already
    /// inside a tokio runtime; blocking there would stall that runtime's worker.
    pub fn block_on<F: Future>(fut: F) -> Result<F::Output, UsageError> {
        if Handle::try_current().is_ok() {
            return Err(UsageError::NestedRuntime);
        }
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| UsageError::RuntimeStart(e.to_string()))?;
        Ok(rt.block_on(fut))
    }
}
