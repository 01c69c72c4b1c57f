//! # Subscription handle.
//!
//! [`Pv`] is what `start()` returns and what every listener receives. It is
//! a cheap clone of a reference to the subscription's director.
//!
//! State accessors read the snapshot of the last delivery under a lock and
//! are independent of the notification path. After [`Pv::close`] the handle
//! keeps answering them with the frozen last-known state.
//!
//! Dropping the last handle closes the subscription: ticking stops and the
//! source is disconnected, as if `close()` had been called. Keep a handle
//! alive for as long as events are wanted.
//!
//! [`PvReader`] and [`PvWriter`] are the narrow views given to read-only and
//! write-only listeners.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LifecycleError, SourceError};
use crate::scheduler::SchedulingPolicy;

use super::director::Director;

/// Read-side view of a subscription.
pub trait PvReader<R> {
    /// Expression name.
    fn name(&self) -> &str;

    /// Value of the last delivery (`None` until a value arrives).
    fn latest_value(&self) -> Option<R>;

    /// Read connection as of the last delivery.
    fn is_read_connected(&self) -> bool;

    /// Most recent failure delivered, if any.
    fn last_error(&self) -> Option<SourceError>;

    /// True once the subscription is closed.
    fn is_closed(&self) -> bool;
}

/// Write-side view of a subscription.
pub trait PvWriter<V> {
    /// Expression name.
    fn name(&self) -> &str;

    /// Issues a write; the outcome arrives as `WriteSucceeded` / `WriteFailed`.
    fn write(&self, value: V) -> Result<(), LifecycleError>;

    /// Write connection as of the last delivery.
    fn is_write_connected(&self) -> bool;

    /// Most recent failure delivered, if any.
    fn last_error(&self) -> Option<SourceError>;

    /// True once the subscription is closed.
    fn is_closed(&self) -> bool;
}

/// Handle of one running subscription.
///
/// Clones share the subscription. When the last clone is dropped the
/// subscription is torn down, so a handle discarded right after `start()`
/// receives no events.
pub struct Pv<R, V> {
    director: Arc<Director<R, V>>,
}

impl<R, V> Clone for Pv<R, V> {
    fn clone(&self) -> Self {
        Self {
            director: Arc::clone(&self.director),
        }
    }
}

impl<R, V> Pv<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    pub(crate) fn from_director(director: Arc<Director<R, V>>) -> Self {
        Self { director }
    }

    /// Expression name: the channel, or the channels joined with `+`.
    pub fn name(&self) -> &str {
        self.director.name()
    }

    /// Value of the last delivery.
    pub fn latest_value(&self) -> Option<R> {
        self.director.snapshot().value.clone()
    }

    /// Read connection as of the last delivery.
    ///
    /// For a combination of channels this is true only if all are connected.
    pub fn is_read_connected(&self) -> bool {
        self.director.snapshot().read_connected
    }

    /// Write connection as of the last delivery.
    pub fn is_write_connected(&self) -> bool {
        self.director.snapshot().write_connected
    }

    /// Most recent failure delivered, if any.
    pub fn last_error(&self) -> Option<SourceError> {
        self.director.snapshot().last_error.clone()
    }

    /// True if the subscription accepts writes.
    pub fn is_writable(&self) -> bool {
        self.director.is_writable()
    }

    /// Scheduling policy in use.
    pub fn policy(&self) -> SchedulingPolicy {
        self.director.policy()
    }

    /// Minimum interval between two deliveries.
    pub fn max_rate(&self) -> Duration {
        self.director.max_rate()
    }

    /// True while paused.
    pub fn is_paused(&self) -> bool {
        self.director.is_paused()
    }

    /// True once closed.
    pub fn is_closed(&self) -> bool {
        self.director.is_closed()
    }

    /// Withdraws demand: ticks stop doing work until [`resume`](Self::resume).
    ///
    /// Pushes keep accumulating. A no-op after close.
    pub fn pause(&self) -> Result<(), LifecycleError> {
        self.director.pause()
    }

    /// Re-asserts demand; delivery restarts from the next tick boundary.
    ///
    /// # Errors
    /// [`LifecycleError::Closed`] after close.
    pub fn resume(&self) -> Result<(), LifecycleError> {
        self.director.resume()
    }

    /// Writes `value` to the write channel.
    ///
    /// # Errors
    /// [`LifecycleError::Closed`] after close, [`LifecycleError::NotWritable`]
    /// without a write side.
    pub fn write(&self, value: V) -> Result<(), LifecycleError> {
        self.director.write(value)
    }

    /// Closes the subscription.
    ///
    /// Idempotent: returns `true` for the call that closed it. Every call
    /// waits for a listener running on another thread to finish, so once any
    /// call returns no listener is invoked again. Called from inside a
    /// listener it returns at once; the rest of that delivery is skipped.
    pub fn close(&self) -> bool {
        self.director.close()
    }
}

impl<R, V> PvReader<R> for Pv<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    fn name(&self) -> &str {
        Pv::name(self)
    }

    fn latest_value(&self) -> Option<R> {
        Pv::latest_value(self)
    }

    fn is_read_connected(&self) -> bool {
        Pv::is_read_connected(self)
    }

    fn last_error(&self) -> Option<SourceError> {
        Pv::last_error(self)
    }

    fn is_closed(&self) -> bool {
        Pv::is_closed(self)
    }
}

impl<R, V> PvWriter<V> for Pv<R, V>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
{
    fn name(&self) -> &str {
        Pv::name(self)
    }

    fn write(&self, value: V) -> Result<(), LifecycleError> {
        Pv::write(self, value)
    }

    fn is_write_connected(&self) -> bool {
        Pv::is_write_connected(self)
    }

    fn last_error(&self) -> Option<SourceError> {
        Pv::last_error(self)
    }

    fn is_closed(&self) -> bool {
        Pv::is_closed(self)
    }
}

impl<R, V> fmt::Debug for Pv<R, V>
where
    R: Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pv")
            .field("name", &self.name())
            .field("value", &self.latest_value())
            .field("read_connected", &self.is_read_connected())
            .field("write_connected", &self.is_write_connected())
            .field("closed", &self.is_closed())
            .finish()
    }
}
