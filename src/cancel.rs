//! Cooperative cancellation token.
//!
//! A [`CancelToken`] is a cloneable handle over a shared atomic flag. The
//! pipelines poll it once per page, immediately before each render begins;
//! an in-flight render/encode always completes once started. Threading the
//! token through function parameters keeps cancellation explicit — there is
//! no global flag to reset between runs; a fresh job gets a fresh token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cooperative cancellation flag.
///
/// All clones observe the same flag. Once set it stays set for the lifetime
/// of the token; start a new job with a new token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
