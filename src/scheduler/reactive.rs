//! # Reactive policy: deliver only what changed, at a bounded rate.
//!
//! Every collector push sets a *dirty* flag. Each tick:
//! ```text
//! dirty?        no  ─► no-op (no idle notifications)
//! demand?       no  ─► skip, dirty is kept
//! slot free?    no  ─► skip, dirty is kept (subsumed by a later tick)
//! clear dirty ─► target.deliver(ticket)   (target reads the *current* state)
//! ```
//! Pushes between two ticks coalesce into one delivery carrying the latest data.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::error::LifecycleError;

use super::in_flight::InFlight;
use super::ticker::Ticker;
use super::{DeliveryTarget, NotificationScheduler, SchedulerState, SchedulingPolicy};

struct Shared {
    dirty: AtomicBool,
    in_flight: Arc<AtomicBool>,
    target: Weak<dyn DeliveryTarget>,
}

impl Shared {
    fn tick(&self) {
        if !self.dirty.load(Ordering::Acquire) {
            return;
        }
        let Some(target) = self.target.upgrade() else {
            return;
        };
        if !target.has_demand() {
            tracing::trace!("reactive tick skipped: no demand");
            return;
        }
        let Some(ticket) = InFlight::try_acquire(&self.in_flight) else {
            tracing::trace!("reactive tick skipped: delivery in flight");
            return;
        };
        // Cleared before the target reads, so a concurrent push re-arms the next tick.
        self.dirty.store(false, Ordering::Release);
        target.deliver(ticket);
    }
}

/// Scheduler that delivers at most once per interval, only when dirty.
pub struct ReactiveScheduler {
    ticker: Ticker,
    shared: Arc<Shared>,
}

impl ReactiveScheduler {
    /// Creates a scheduler ticking every `max_rate` on `runtime`.
    pub fn new(max_rate: Duration, runtime: Handle, target: Weak<dyn DeliveryTarget>) -> Self {
        Self {
            ticker: Ticker::new(max_rate, runtime),
            shared: Arc::new(Shared {
                dirty: AtomicBool::new(false),
                in_flight: Arc::new(AtomicBool::new(false)),
                target,
            }),
        }
    }

    /// True if something was pushed since the last delivery.
    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.load(Ordering::Acquire)
    }
}

impl NotificationScheduler for ReactiveScheduler {
    fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::Reactive
    }

    fn max_rate(&self) -> Duration {
        self.ticker.period()
    }

    fn state(&self) -> SchedulerState {
        self.ticker.state()
    }

    fn start(&self) -> Result<(), LifecycleError> {
        let shared = Arc::clone(&self.shared);
        self.ticker.start(move || shared.tick())
    }

    fn pause(&self) -> Result<(), LifecycleError> {
        self.ticker.pause()
    }

    fn resume(&self) -> Result<(), LifecycleError> {
        self.ticker.resume()
    }

    fn close(&self) -> bool {
        self.ticker.close()
    }

    fn notify(&self) {
        self.shared.dirty.store(true, Ordering::Release);
    }
}
