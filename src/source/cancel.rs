//! Cancellation token checked by the capture loop on every poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that ends a capture early.
///
/// Clones share the same flag, so a signal handler can hold one
/// copy while the capture stream polls another.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = Cancellation::new();
        let handler_copy = token.clone();

        assert!(!token.is_cancelled());
        handler_copy.cancel();
        assert!(token.is_cancelled());
    }
}
