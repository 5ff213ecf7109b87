// src/exec/abort.rs

//! Cooperative abort flag shared between the caller and a running operation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Cloneable handle to one run's abort flag.
///
/// `abort()` may be called from any thread, any number of times, before or
/// during a run. The flag never resets; a fresh runner gets a fresh handle.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    inner: Arc<AbortInner>,
}

#[derive(Debug, Default)]
struct AbortInner {
    flag: AtomicBool,
    notify: Notify,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake whoever is waiting in [`AbortHandle::aborted`].
    ///
    /// Returns `true` only for the call that actually set the flag.
    pub fn abort(&self) -> bool {
        let first = !self.inner.flag.swap(true, Ordering::SeqCst);
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolve once the flag is set (immediately if it already is).
    pub async fn aborted(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent `abort()`
            // cannot slip between the check and the await.
            notified.as_mut().enable();

            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }
}
