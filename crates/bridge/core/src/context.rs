//! Per-call context.

use std::time::Duration;

/// Options for one call, passed alongside its arguments.
#[derive(Clone, Default, Debug)]
pub struct CallContext {
    /// Deadline for this call; overrides the proxy's configured timeout.
    pub timeout: Option<Duration>,
}

impl CallContext {
    /// Create a new default context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
