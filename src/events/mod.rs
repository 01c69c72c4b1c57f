//! Subscription events: what the consumer sees and what collectors report.
//!
//! This module groups the two event data models of the pipeline:
//!
//! ## Contents
//! - [`Event`] immutable, consumer-visible description of what changed
//! - [`Notification`] raw report from a collector to its director
//!
//! ## Quick reference
//! ```text
//! DataSource ─► Collector ── Notification ──► Director ── Event ──► listeners
//!              (any thread)                 (coalesced per tick)   (executor)
//! ```
//! Notifications are accumulated between ticks; every delivery turns the
//! accumulated set into an ordered batch of events.

mod event;
mod notification;

pub use event::Event;
pub use notification::Notification;
