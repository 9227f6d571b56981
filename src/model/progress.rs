//! Caller-owned cancellation handle for page list fetches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation handle shared between a download orchestrator and the
/// connector.
///
/// The orchestrator requests cancellation; the connector polls the request
/// before issuing a chapter request and marks the token cancelled whenever it
/// gives up on a chapter. Clones share the same flags.
#[derive(Debug, Clone, Default)]
pub struct ProgressToken {
    requested: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl ProgressToken {
    /// Creates a token with no cancellation requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the connector to stop working on this chapter.
    pub fn request_cancellation(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancellation_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Marks the operation as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once the operation was marked cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
