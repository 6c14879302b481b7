//! A single root cancellation signal shared by the run loop, the
//! periodic redraw task, and every subscriber forwarder.
//!
//! The teacher workspace has no `tokio-util` dependency, so rather than
//! add one for `CancellationToken` this crate builds the same shape
//! out of a `Notify` plus an `AtomicBool`: cheap to clone via `Arc`,
//! cheap to poll, and `cancelled()` resolves immediately for any task
//! that starts waiting after cancellation already happened.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A cancellation signal. Clone and share via `Arc` (or clone this type
/// directly, which clones the inner `Arc`).
#[derive(Clone, Debug)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    /// A fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// True if [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once the signal has fired, immediately if it already
    /// has.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_immediately_after_cancel() {
        let token = CancelToken::new();
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_millis(50), token.cancelled())
            .await
            .expect("cancelled() should resolve immediately");
    }

    #[tokio::test]
    async fn cancelled_waits_until_cancel() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        token.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn clone_shares_state() {
        let a = CancelToken::new();
        let b = a.clone();
        a.cancel();
        assert!(b.is_cancelled());
    }
}
