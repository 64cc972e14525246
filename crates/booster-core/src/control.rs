//! Cancellation: a cloneable abort flag shared between caller, coordinator,
//! and in-flight fetchers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancel signal for a running job.
///
/// Workers check the token before starting a range, and curl transfers poll
/// it from their progress callback, so firing it stops in-flight fetches.
/// The coordinator also arms it internally when a deadline elapses.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All clones of this token observe it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
