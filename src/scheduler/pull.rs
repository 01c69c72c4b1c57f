//! # Pull policy: recompute the aggregate on every demanded tick.
//!
//! Used when the consumer's value combines several collectors: pulling one
//! fresh combined snapshot per tick replaces reacting to every underlying push.
//!
//! ```text
//! demand?     no  ─► skip entirely (the read function is not called)
//! slot free?  no  ─► skip (subsumed by a later tick)
//! value = read.current_value() ─► target.deliver_pulled(value, ticket)
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::collectors::ReadFunction;
use crate::error::LifecycleError;

use super::in_flight::InFlight;
use super::ticker::Ticker;
use super::{NotificationScheduler, PullTarget, SchedulerState, SchedulingPolicy};

struct Shared<R> {
    read: Arc<dyn ReadFunction<R>>,
    in_flight: Arc<AtomicBool>,
    target: Weak<dyn PullTarget<R>>,
}

impl<R> Shared<R> {
    fn tick(&self) {
        let Some(target) = self.target.upgrade() else {
            return;
        };
        if !target.has_demand() {
            tracing::trace!("pull tick skipped: no demand");
            return;
        }
        let Some(ticket) = InFlight::try_acquire(&self.in_flight) else {
            tracing::trace!("pull tick skipped: delivery in flight");
            return;
        };
        let value = self.read.current_value();
        target.deliver_pulled(value, ticket);
    }
}

/// Scheduler that pulls and delivers a fresh aggregate on every demanded tick.
pub struct PullScheduler<R> {
    ticker: Ticker,
    shared: Arc<Shared<R>>,
}

impl<R: Send + 'static> PullScheduler<R> {
    /// Creates a scheduler pulling `read` every `max_rate` on `runtime`.
    pub fn new(
        max_rate: Duration,
        runtime: Handle,
        read: Arc<dyn ReadFunction<R>>,
        target: Weak<dyn PullTarget<R>>,
    ) -> Self {
        Self {
            ticker: Ticker::new(max_rate, runtime),
            shared: Arc::new(Shared {
                read,
                in_flight: Arc::new(AtomicBool::new(false)),
                target,
            }),
        }
    }
}

impl<R: Send + 'static> NotificationScheduler for PullScheduler<R> {
    fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::Pull
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

    // Individual pushes are picked up by the next pull.
    fn notify(&self) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time;

    use super::*;
    use crate::scheduler::DeliveryTarget;

    #[derive(Default)]
    struct Sink {
        demand: AtomicBool,
        values: Mutex<Vec<usize>>,
    }

    impl DeliveryTarget for Sink {
        fn has_demand(&self) -> bool {
            self.demand.load(Ordering::SeqCst)
        }

        fn deliver(&self, _ticket: InFlight) {}
    }

    impl PullTarget<usize> for Sink {
        fn deliver_pulled(&self, value: usize, _ticket: InFlight) {
            self.values.lock().unwrap().push(value);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn withdrawn_demand_stops_pulls_entirely() {
        let pulls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pulls);
        let read: Arc<dyn ReadFunction<usize>> =
            Arc::new(move || counter.fetch_add(1, Ordering::SeqCst) + 1);

        let sink = Arc::new(Sink::default());
        sink.demand.store(true, Ordering::SeqCst);
        let weak: Weak<Sink> = Arc::downgrade(&sink);
        let s = PullScheduler::new(Duration::from_millis(100), Handle::current(), read, weak);
        s.start().unwrap();

        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(*sink.values.lock().unwrap(), vec![1, 2, 3]);

        sink.demand.store(false, Ordering::SeqCst);
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(pulls.load(Ordering::SeqCst), 3);

        sink.demand.store(true, Ordering::SeqCst);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*sink.values.lock().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(s.policy(), SchedulingPolicy::Pull);
    }
}
