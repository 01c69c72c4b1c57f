//! # Data sources: the external side that feeds collectors.
//!
//! A [`DataSource`] owns the transport to the values (a network protocol, a
//! device driver, an in-process table). The subscription only hands it
//! collectors:
//!
//! ```text
//! connect_read(channel, push) ──► source calls push.update_*(…) from any thread
//! connect_write(channel, wc)  ──► source reports write connectivity on wc
//! write(channel, v, done)     ──► source resolves `done` exactly once
//! disconnect_*(channel, …)    ──► source stops calling that collector
//! ```
//!
//! The subscription never forcibly unsubscribes a source: after close it
//! deregisters the collectors' targets, so late calls are simply not heard.

mod completion;
mod local;

use std::sync::Arc;

use crate::collectors::{PushCollector, WriteCollector};

pub use completion::WriteCompletion;
pub use local::LocalSource;

/// Capability a subscription needs from a data source.
pub trait DataSource<V>: Send + Sync {
    /// Source name (for logs).
    fn name(&self) -> &str;

    /// Starts feeding `collector` with the state of `channel`.
    fn connect_read(&self, channel: &str, collector: Arc<dyn PushCollector<V>>);

    /// Stops feeding `collector`.
    fn disconnect_read(&self, channel: &str, collector: &Arc<dyn PushCollector<V>>);

    /// Starts reporting write connectivity of `channel` on `collector`.
    fn connect_write(&self, channel: &str, collector: Arc<WriteCollector>);

    /// Stops reporting to `collector`.
    fn disconnect_write(&self, channel: &str, collector: &Arc<WriteCollector>);

    /// Writes `value` to `channel`; the outcome is reported on `completion`.
    fn write(&self, channel: &str, value: V, completion: WriteCompletion);
}
