//! Stop signal for a running pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Asks a pipeline run to stop between events.
///
/// The orchestrator checks the flag before each stage and after every
/// forwarded event. Clones observe the same flag, so a caller can keep one
/// and hand another to a stage or a watcher thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    requested: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stop has been requested for the run.
    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Request the run to stop. The final payload is still persisted.
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let watcher = token.clone();
        assert!(!watcher.is_cancelled());
        token.cancel();
        assert!(watcher.is_cancelled());
    }
}
