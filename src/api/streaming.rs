//! Per-request options for streaming sends

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Default pause before each fragment is handed to the caller
pub const DEFAULT_DELAY_MS: u64 = 100;

/// Options for a single [`ChatClient::send`](super::ChatClient::send) call
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Pause before each fragment delivery; zero disables pacing
    pub delay: Duration,
    /// Optional handle to stop the request early
    pub abort: Option<AbortHandle>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            abort: None,
        }
    }
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_delay_ms(self, delay_ms: u64) -> Self {
        self.with_delay(Duration::from_millis(delay_ms))
    }

    pub fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.abort.as_ref().is_some_and(AbortHandle::is_aborted)
    }

    /// Resolves once the abort handle fires; never resolves without one.
    pub(crate) async fn aborted(&self) {
        match &self.abort {
            Some(handle) => handle.cancelled().await,
            None => std::future::pending().await,
        }
    }
}

#[derive(Debug, Default)]
struct AbortState {
    aborted: AtomicBool,
    notify: Notify,
}

/// Cloneable signal used to abort an in-flight request
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    state: Arc<AbortState>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.state.aborted.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_aborted(&self) -> bool {
        self.state.aborted.load(Ordering::SeqCst)
    }

    /// Wait until [`abort`](Self::abort) is called.
    pub async fn cancelled(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent abort is not missed
        notified.as_mut().enable();

        if self.is_aborted() {
            return;
        }
        notified.await;
    }
}
