//! Cancellation tokens for directory walks and delegated commands.
//!
//! Every long-running operation takes a `&CancellationToken` and calls
//! [`CancellationToken::check`] at each step, so a cancelled walk reports
//! [`MmakeError::Cancelled`] instead of an empty result.

use crate::MmakeError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token nobody holds a handle to cancel. Useful for tests.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    #[inline]
    pub fn check(&self) -> crate::Result<()> {
        if self.is_cancelled() {
            Err(MmakeError::Cancelled)
        } else {
            Ok(())
        }
    }
}
