//! # One-shot connection timeout.
//!
//! ```text
//! arm(runtime, timeout) ──► spawn ─┬─ disarm token cancelled ─► exit quietly
//!                                  └─ sleep(timeout) elapsed  ─► on_fire()
//! ```
//! The token exists before the timer is spawned, so a connection observed
//! while the subscription is still starting disarms it ahead of time. It is
//! never re-armed.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Default message attached to the synthesized timeout error.
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "Connection timeout";

/// Connection-timeout option of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTimeout {
    /// Window after start within which a connection must be observed.
    pub timeout: Duration,
    /// Message carried by the timeout error.
    pub message: String,
}

impl ConnectionTimeout {
    /// Creates a timeout with the default message.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            message: DEFAULT_TIMEOUT_MESSAGE.to_string(),
        }
    }

    /// Replaces the message carried by the timeout error.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Disarmable one-shot timer.
#[derive(Debug, Default)]
pub(crate) struct TimeoutArm {
    disarm: CancellationToken,
}

impl TimeoutArm {
    /// Spawns the timer; `on_fire` runs once unless disarmed first.
    pub(crate) fn arm<F>(&self, runtime: &Handle, timeout: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let disarm = self.disarm.clone();
        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = disarm.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    tracing::debug!(?timeout, "connection timeout fired");
                    on_fire();
                }
            }
        });
        tracing::debug!(?timeout, "connection timeout armed");
    }

    /// Disarms the timer. Returns `true` on the first call.
    pub(crate) fn disarm(&self) -> bool {
        if self.disarm.is_cancelled() {
            return false;
        }
        self.disarm.cancel();
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_timeout() {
        let arm = TimeoutArm::default();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        arm.arm(&Handle::current(), Duration::from_millis(50), move || {
            flag.store(true, Ordering::SeqCst)
        });

        tokio::time::sleep(Duration::from_millis(49)).await;
        assert!(!fired.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn early_disarm_wins() {
        let arm = TimeoutArm::default();
        assert!(arm.disarm());
        assert!(!arm.disarm());

        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        arm.arm(&Handle::current(), Duration::from_millis(50), move || {
            flag.store(true, Ordering::SeqCst)
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn default_message() {
        let t = ConnectionTimeout::new(Duration::from_secs(1));
        assert_eq!(t.message, "Connection timeout");
        assert_eq!(t.with_message("no IOC").message, "no IOC");
    }
}
