//! Cancellation primitives
//!
//! An [`AbortController`] is the caller-side switch; an [`AbortSignal`] is the
//! read-only view handed to code that has to observe it. Both wrap the same
//! `CancellationToken`, so aborting wakes every pending waiter at once.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Caller-owned switch used to stop a stream before it completes.
#[derive(Clone, Debug, Default)]
pub struct AbortController {
    token: CancellationToken,
}

impl AbortController {
    /// Create a controller that has not been aborted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort. Idempotent.
    pub fn abort(&self) {
        self.token.cancel();
    }

    /// Check if abort was requested.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            token: self.token.clone(),
        }
    }
}

/// Read-only view of an [`AbortController`].
#[derive(Clone, Debug)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    /// Check if abort was requested.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves once abort is requested.
    pub fn aborted(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
