//! Latest-wins coalescing for rapid recomposite requests.
//!
//! Interactive frontends re-render the framed preview on every settings
//! change, and a slider drag arrives as a burst; a `Debouncer` folds
//! that burst into one composite. The one-shot command-line tools
//! render once per invocation and do not construct one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Coalesces bursts of requests into one. Every call supersedes the
/// pending one; an action only runs once the delay elapses without a
/// newer call arriving, so the latest request is authoritative.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    /// Delay for interactive recomposite triggers.
    pub const RECOMPOSITE_DELAY: Duration = Duration::from_millis(150);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule `action` after the delay. The returned handle resolves
    /// to whether the action ran or was superseded.
    pub fn call<F>(&self, action: F) -> tokio::task::JoinHandle<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        let scheduled = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.generation.clone();
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != scheduled {
                return false;
            }
            action();
            true
        })
    }

    /// Drop the pending action, if any, without scheduling a new one.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
