//! # Read collector: the rate-decoupling point of the read side.
//!
//! [`ReadCollector`] is written by the data source and read by the scheduler.
//! All three fields (stored value, connection flag, notification target) are
//! guarded by one mutex; notifications are issued after the mutex is released.

use std::sync::Mutex;

use crate::error::SourceError;
use crate::events::Notification;
use crate::sync::lock;

use super::collector::{Collector, NotificationTarget, PushCollector, ReadFunction};
use super::store::{CollectorStore, LatestValue, ValueQueue};

/// Collector keeping only the latest value.
pub type LatestValueCollector<T> = ReadCollector<LatestValue<T>>;

/// Collector keeping every value since the last read.
pub type QueueCollector<T> = ReadCollector<ValueQueue<T>>;

struct State<S> {
    store: S,
    connected: bool,
    target: Option<NotificationTarget>,
}

/// Thread-safe mailbox for one read channel.
///
/// Implements [`PushCollector`] for the data source and [`ReadFunction`] for
/// the scheduler.
///
/// # Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use pvflow::{Collector, LatestValueCollector, Notification, PushCollector, ReadFunction};
///
/// let collector = Arc::new(LatestValueCollector::<u32>::latest());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// collector.set_notification_target(Some(Arc::new(move |n: Notification| sink.lock().unwrap().push(n))));
///
/// collector.update_value_and_connection(Some(7), true);
/// assert_eq!(collector.current_value(), Some(7));
/// assert!(collector.connection());
/// assert_eq!(*seen.lock().unwrap(), vec![Notification::ValueAndConnection { connected: true }]);
/// ```
pub struct ReadCollector<S: CollectorStore> {
    state: Mutex<State<S>>,
}

impl<T> ReadCollector<LatestValue<T>>
where
    T: Clone + Send + 'static,
{
    /// Creates a collector keeping the latest value.
    pub fn latest() -> Self {
        Self::new(LatestValue::default())
    }
}

impl<T> ReadCollector<ValueQueue<T>>
where
    T: Send + 'static,
{
    /// Creates a collector queueing up to `capacity` values between reads.
    pub fn queue(capacity: usize) -> Self {
        Self::new(ValueQueue::new(capacity))
    }
}

impl<S: CollectorStore> ReadCollector<S> {
    /// Creates a disconnected collector over `store`.
    pub fn new(store: S) -> Self {
        Self {
            state: Mutex::new(State {
                store,
                connected: false,
                target: None,
            }),
        }
    }

    /// Applies `mutate` under the lock, then notifies the target without it.
    fn publish(&self, mutate: impl FnOnce(&mut State<S>), notification: Notification) {
        let target = {
            let mut state = lock(&self.state);
            mutate(&mut state);
            state.target.clone()
        };
        if let Some(target) = target {
            target(notification);
        }
    }
}

impl<S: CollectorStore> PushCollector<S::Input> for ReadCollector<S> {
    fn update_value(&self, value: Option<S::Input>) {
        self.publish(|st| st.store.push(value), Notification::Value);
    }

    fn update_value_and_connection(&self, value: Option<S::Input>, connected: bool) {
        self.publish(
            |st| {
                st.store.push(value);
                st.connected = connected;
            },
            Notification::ValueAndConnection { connected },
        );
    }

    fn update_connection(&self, connected: bool) {
        self.publish(
            |st| st.connected = connected,
            Notification::ReadConnection { connected },
        );
    }

    fn notify_error(&self, error: SourceError) {
        self.publish(|_| {}, Notification::Error(error));
    }
}

impl<S: CollectorStore> ReadFunction<S::Output> for ReadCollector<S> {
    fn current_value(&self) -> S::Output {
        lock(&self.state).store.read()
    }
}

impl<S: CollectorStore> Collector for ReadCollector<S> {
    fn set_notification_target(&self, target: Option<NotificationTarget>) {
        lock(&self.state).target = target;
    }

    fn connection(&self) -> bool {
        lock(&self.state).connected
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn recording<S: CollectorStore>(
        collector: &ReadCollector<S>,
    ) -> Arc<Mutex<Vec<Notification>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        collector.set_notification_target(Some(Arc::new(move |n: Notification| {
            sink.lock().unwrap().push(n);
        })));
        seen
    }

    #[test]
    fn combined_update_is_one_notification() {
        let c = LatestValueCollector::latest();
        let seen = recording(&c);

        c.update_value_and_connection(Some(1.5), true);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Notification::ValueAndConnection { connected: true }]
        );
        assert_eq!(c.current_value(), Some(1.5));
        assert!(c.connection());
    }

    #[test]
    fn value_update_keeps_connection() {
        let c = LatestValueCollector::latest();
        c.update_connection(true);
        c.update_value(Some("a"));
        assert!(c.connection());
        c.update_value(None);
        assert_eq!(c.current_value(), None);
        assert!(c.connection());
    }

    #[test]
    fn error_does_not_touch_state() {
        let c = LatestValueCollector::latest();
        let seen = recording(&c);
        c.update_value_and_connection(Some(9), true);
        c.notify_error(SourceError::failed("io"));

        assert_eq!(c.current_value(), Some(9));
        assert!(c.connection());
        assert_eq!(
            seen.lock().unwrap().last(),
            Some(&Notification::Error(SourceError::failed("io")))
        );
    }

    #[test]
    fn target_can_reenter_collector() {
        let c = Arc::new(LatestValueCollector::latest());
        let observed = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&c);
        let sink = Arc::clone(&observed);
        c.set_notification_target(Some(Arc::new(move |_n: Notification| {
            if let Some(c) = weak.upgrade() {
                sink.lock().unwrap().push((c.current_value(), c.connection()));
            }
        })));

        c.update_value_and_connection(Some(4), true);
        c.update_connection(false);

        assert_eq!(
            *observed.lock().unwrap(),
            vec![(Some(4), true), (Some(4), false)]
        );
    }

    #[test]
    fn deregistered_target_is_silent() {
        let c = LatestValueCollector::latest();
        let seen = recording(&c);
        c.update_value(Some(1));
        c.set_notification_target(None);
        c.update_value(Some(2));

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(c.current_value(), Some(2));
    }

    #[test]
    fn queue_collector_drains_on_read() {
        let c = QueueCollector::queue(8);
        c.update_value(Some(1));
        c.update_value(Some(2));
        assert_eq!(c.current_value(), vec![1, 2]);
        assert!(c.current_value().is_empty());
    }

    #[test]
    fn concurrent_writers_leave_a_written_value() {
        let c = Arc::new(LatestValueCollector::latest());
        let count = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&count);
        c.set_notification_target(Some(Arc::new(move |_: Notification| *sink.lock().unwrap() += 1)));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let c = Arc::clone(&c);
                thread::spawn(move || {
                    for i in 0..250 {
                        c.update_value(Some(t * 1000 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(*count.lock().unwrap(), 1000);
        let last = c.current_value().unwrap();
        assert_eq!(last % 1000, 249);
    }
}
