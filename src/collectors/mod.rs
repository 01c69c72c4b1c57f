//! Collectors: thread-safe mailboxes between data sources and the scheduler.
//!
//! A collector is written from the data-source side (any thread, any rate) and
//! read from the scheduler side. It knows nothing about rates or listeners: it
//! stores the latest state and forwards a [`Notification`](crate::Notification)
//! to a single registered target.
//!
//! ## Capabilities
//! - [`PushCollector`] what a data source may call
//! - [`ReadFunction`]  the pull contract used by the schedulers
//! - [`Collector`]     director-side control (target slot, connection flag)
//!
//! ## Implementations
//! - [`ReadCollector`] over a [`CollectorStore`]: [`LatestValue`] or [`ValueQueue`]
//! - [`WriteCollector`] connection flag and write outcomes of the write side
//!
//! ## Lock discipline
//! ```text
//! update_*(…) ──► lock ─► mutate fields ─► copy target ─► unlock ──► target(notification)
//! ```
//! The target is never invoked while the lock is held, so it may re-enter the
//! collector (read the value, query the connection) without deadlocking.

mod collector;
mod read;
mod store;
mod write;

pub use collector::{Collector, NotificationTarget, PushCollector, ReadFunction};
pub use read::{LatestValueCollector, QueueCollector, ReadCollector};
pub use store::{CollectorStore, LatestValue, ValueQueue};
pub use write::WriteCollector;
