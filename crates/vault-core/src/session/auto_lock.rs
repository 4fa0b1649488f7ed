//! Idle timer that locks the vault
//!
//! Arming spawns a sleeping task and aborts the one it replaces. Each arm
//! bumps a generation counter; the expiry callback receives the generation
//! it was armed with so a replaced timer that already woke up can tell it
//! is stale.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub(crate) struct AutoLockTimer {
    idle_timeout: Option<Duration>,
    generation: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AutoLockTimer {
    pub(crate) fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            idle_timeout,
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
        }
    }

    pub(crate) fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Replace any pending timer with a fresh one. No-op when auto-lock is disabled.
    pub(crate) fn arm<F, Fut>(&self, on_expire: F)
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Some(timeout) = self.idle_timeout else {
            return;
        };

        // Bump and spawn under the same lock so the stored handle always
        // belongs to the newest generation.
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            on_expire(generation).await;
        });

        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
        debug!("Auto-lock armed for {:?} (generation {})", timeout, generation);
    }

    /// Cancel the pending timer, if any
    pub(crate) fn disarm(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(previous) = pending.take() {
            previous.abort();
            debug!("Auto-lock disarmed");
        }
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    #[cfg(test)]
    pub(crate) fn pending_is_empty(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Drop for AutoLockTimer {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
