//! # Collector capability traits.
//!
//! The push and pull sides of a collector are separate capabilities: a data
//! source only ever sees [`PushCollector`], a scheduler only ever sees
//! [`ReadFunction`], and the director owns the [`Collector`] control surface.

use std::sync::Arc;

use crate::error::SourceError;
use crate::events::Notification;

/// Callback registered in a collector's single notification slot.
pub type NotificationTarget = Arc<dyn Fn(Notification) + Send + Sync>;

/// Source-facing write capability of a read collector.
///
/// Every method may be called from any thread, at any rate, for the lifetime
/// of the collector. Calls never block on the consumer.
pub trait PushCollector<I>: Send + Sync {
    /// Stores `value` as the latest value; the connection flag is untouched.
    ///
    /// `None` is the "unset" sentinel and is propagated as-is.
    fn update_value(&self, value: Option<I>);

    /// Stores value and connection in one critical section and issues a single
    /// combined notification.
    fn update_value_and_connection(&self, value: Option<I>, connected: bool);

    /// Updates the connection flag only.
    fn update_connection(&self, connected: bool);

    /// Forwards a runtime failure; stored value and connection are untouched.
    fn notify_error(&self, error: SourceError);
}

/// Pull contract: returns the current collected value.
pub trait ReadFunction<O>: Send + Sync {
    /// Returns the current value.
    fn current_value(&self) -> O;
}

impl<O, F> ReadFunction<O> for F
where
    F: Fn() -> O + Send + Sync,
{
    fn current_value(&self) -> O {
        self()
    }
}

/// Director-facing control surface shared by read and write collectors.
pub trait Collector: Send + Sync {
    /// Replaces the registered target; `None` deregisters.
    ///
    /// Only one target is registered at a time.
    fn set_notification_target(&self, target: Option<NotificationTarget>);

    /// Current connection flag.
    fn connection(&self) -> bool;
}
