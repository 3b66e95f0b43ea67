use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// How a bounded wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The token was set before the timeout elapsed.
    Cancelled,
    /// The full timeout elapsed without cancellation.
    TimedOut,
}

/// Single-use, idempotent cancellation flag shared between the controller and
/// the polling loop.
///
/// `cancel` may be called any number of times from any task; waiters wake on
/// the first call. The wait itself parks on a [`Notify`] rather than
/// busy-polling the flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token. Idempotent and thread-safe.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Block for up to `timeout`, or until the token is set, whichever comes
    /// first.
    ///
    /// A token set before or during the call returns
    /// [`WaitOutcome::Cancelled`] promptly; the enable-then-recheck sequence
    /// closes the window where a set racing the wait could be missed.
    pub async fn wait_for(&self, timeout: Duration) -> WaitOutcome {
        if self.is_cancelled() {
            return WaitOutcome::Cancelled;
        }

        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_cancelled() {
            return WaitOutcome::Cancelled;
        }

        tokio::select! {
            _ = &mut notified => WaitOutcome::Cancelled,
            _ = tokio::time::sleep(timeout) => WaitOutcome::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn wait_on_a_set_token_returns_immediately() {
        let token = CancelToken::new();
        token.cancel();

        let outcome = token.wait_for(Duration::from_secs(3600)).await;
        assert_eq!(outcome, WaitOutcome::Cancelled);
    }

    #[tokio::test]
    async fn short_wait_times_out_on_an_unset_token() {
        let token = CancelToken::new();

        let outcome = token.wait_for(Duration::from_millis(20)).await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    #[tokio::test]
    async fn clones_observe_the_same_flag() {
        let token = CancelToken::new();
        let observer = token.clone();

        token.cancel();
        assert!(observer.is_cancelled());
    }
}
