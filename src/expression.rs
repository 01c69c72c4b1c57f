//! # Read/write expressions.
//!
//! An [`Expression`] names the channels a subscription connects to and how
//! their collected values become the value `R` the listeners see:
//!
//! | Constructor                  | Collectors              | Value `R`             | Policy   | Writable |
//! |------------------------------|-------------------------|-----------------------|----------|----------|
//! | [`Expression::channel`]      | one [`LatestValue`]     | `V`                   | reactive | yes      |
//! | [`Expression::queue`]        | one [`ValueQueue`]      | `Vec<V>`              | reactive | yes      |
//! | [`Expression::combine`]      | one `LatestValue` each  | `f(&[Option<V>])`     | pull     | no       |
//!
//! A single directly-read collector is notification-worthy on every push, so
//! it is scheduled reactively. A combination is recomputed from a fresh pull
//! on every tick instead of reacting to each underlying push.
//!
//! Reads across the collectors of a combination are not one atomic
//! snapshot: each collector is individually consistent, and skew between
//! them is bounded by one tick interval.
//!
//! [`LatestValue`]: crate::LatestValue
//! [`ValueQueue`]: crate::ValueQueue

use std::fmt;
use std::sync::Arc;

use crate::collectors::{
    Collector, LatestValueCollector, PushCollector, QueueCollector, ReadFunction,
};
use crate::scheduler::SchedulingPolicy;

/// One read channel bound to its collector.
pub(crate) struct ChannelBinding<V> {
    pub(crate) channel: String,
    pub(crate) push: Arc<dyn PushCollector<V>>,
    pub(crate) control: Arc<dyn Collector>,
}

/// Channels plus the function turning their collectors into a value.
pub struct Expression<R, V> {
    pub(crate) bindings: Vec<ChannelBinding<V>>,
    pub(crate) read: Arc<dyn ReadFunction<Option<R>>>,
    pub(crate) policy: SchedulingPolicy,
    pub(crate) write_channel: Option<String>,
}

impl<V> Expression<V, V>
where
    V: Clone + Send + 'static,
{
    /// Latest value of one channel; writes go to the same channel.
    pub fn channel(name: impl Into<String>) -> Self {
        let name = name.into();
        let collector = Arc::new(LatestValueCollector::<V>::latest());
        let pull = Arc::clone(&collector);
        Self {
            bindings: vec![ChannelBinding {
                channel: name.clone(),
                push: collector.clone(),
                control: collector,
            }],
            read: Arc::new(move || pull.current_value()),
            policy: SchedulingPolicy::Reactive,
            write_channel: Some(name),
        }
    }
}

impl<V> Expression<Vec<V>, V>
where
    V: Send + 'static,
{
    /// Every value of one channel since the previous delivery, oldest first.
    ///
    /// At most `capacity` values are kept; older ones are discarded.
    pub fn queue(name: impl Into<String>, capacity: usize) -> Self {
        let name = name.into();
        let collector = Arc::new(QueueCollector::<V>::queue(capacity));
        let pull = Arc::clone(&collector);
        Self {
            bindings: vec![ChannelBinding {
                channel: name.clone(),
                push: collector.clone(),
                control: collector,
            }],
            read: Arc::new(move || Some(pull.current_value())),
            policy: SchedulingPolicy::Reactive,
            write_channel: Some(name),
        }
    }
}

impl<R, V> Expression<R, V>
where
    R: Send + 'static,
    V: Clone + Send + 'static,
{
    /// Combination of several channels, recomputed on every tick.
    ///
    /// `f` receives the latest value of each channel in `names` order.
    ///
    /// # Example
    /// ```rust
    /// use pvflow::Expression;
    ///
    /// let sum = Expression::combine(["a", "b"], |vals: &[Option<f64>]| {
    ///     vals.iter().copied().sum::<Option<f64>>()
    /// });
    /// assert_eq!(sum.channels(), vec!["a", "b"]);
    /// assert!(!sum.is_writable());
    /// ```
    pub fn combine<I, S, F>(names: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Option<V>]) -> Option<R> + Send + Sync + 'static,
    {
        let mut bindings = Vec::new();
        let mut collectors = Vec::new();
        for name in names {
            let collector = Arc::new(LatestValueCollector::<V>::latest());
            collectors.push(Arc::clone(&collector));
            bindings.push(ChannelBinding {
                channel: name.into(),
                push: collector.clone(),
                control: collector,
            });
        }
        let read = move || {
            let values: Vec<Option<V>> = collectors.iter().map(|c| c.current_value()).collect();
            f(&values)
        };
        Self {
            bindings,
            read: Arc::new(read),
            policy: SchedulingPolicy::Pull,
            write_channel: None,
        }
    }
}

impl<R, V> Expression<R, V> {
    /// Read channel names, in binding order.
    pub fn channels(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.channel.as_str()).collect()
    }

    /// Scheduling policy the expression's read side needs.
    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// True if the expression accepts writes.
    pub fn is_writable(&self) -> bool {
        self.write_channel.is_some()
    }

    /// Name shown in logs: the channel, or the channels joined with `+`.
    pub fn name(&self) -> String {
        self.channels().join("+")
    }
}

impl<R, V> fmt::Debug for Expression<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("channels", &self.channels())
            .field("policy", &self.policy)
            .field("write_channel", &self.write_channel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_reads_latest_and_is_writable() {
        let e = Expression::<u8, u8>::channel("a");
        e.bindings[0].push.update_value(Some(1));
        e.bindings[0].push.update_value(Some(2));
        assert_eq!(e.read.current_value(), Some(2));
        assert_eq!(e.policy(), SchedulingPolicy::Reactive);
        assert!(e.is_writable());
    }

    #[test]
    fn queue_drains_in_order() {
        let e = Expression::<Vec<u8>, u8>::queue("a", 8);
        for v in 1..=3 {
            e.bindings[0].push.update_value(Some(v));
        }
        assert_eq!(e.read.current_value(), Some(vec![1, 2, 3]));
        assert_eq!(e.read.current_value(), Some(vec![]));
    }

    #[test]
    fn combine_pulls_every_collector() {
        let e = Expression::combine(["a", "b"], |v: &[Option<i32>]| match v {
            [Some(a), Some(b)] => Some(a + b),
            _ => None,
        });
        assert_eq!(e.policy(), SchedulingPolicy::Pull);
        assert_eq!(e.name(), "a+b");
        e.bindings[0].push.update_value(Some(2));
        assert_eq!(e.read.current_value(), None);
        e.bindings[1].push.update_value(Some(40));
        assert_eq!(e.read.current_value(), Some(42));
    }
}
