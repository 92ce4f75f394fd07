//! [`ShutdownSignal`] – process-wide asynchronous stop flag.
//!
//! Set once by the signal-handler context (SIGINT/SIGTERM) or by the server
//! loop itself on a fatal condition, and polled by the loop at iteration
//! boundaries.  Never cleared.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set-once stop flag.  Cloning shares the underlying flag.
///
/// Setting is idempotent and safe from any thread; polling is lock-free and
/// non-blocking.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal(Arc<AtomicBool>);

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown.  Calling this again is indistinguishable from
    /// calling it once.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
