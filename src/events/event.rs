//! # Events delivered to subscription listeners.
//!
//! The [`Event`] enum classifies changes across two directions:
//! - **Read events**: value and read-connection changes
//! - **Write events**: write-connection changes and write outcomes
//!
//! [`Event::Error`] belongs to both: it reaches read-only and write-only
//! listeners alike.
//!
//! An event carries no payload value. Listeners read the current state from the
//! subscription handle they receive alongside the event; the handle is updated
//! with the delivery's snapshot before the first event of the delivery runs.
//!
//! ## Ordering guarantees
//! Events of one delivery are emitted in a fixed order:
//! `ReadConnectionChanged`, `WriteConnectionChanged`, `ValueChanged`,
//! `Error`s, then write outcomes. Deliveries of one subscription never overlap
//! and are never reordered.
//!
//! ## Example
//! ```rust
//! use pvflow::{Event, SourceError};
//!
//! let ev = Event::Error(SourceError::failed("boom"));
//! assert!(ev.is_read_event());
//! assert!(ev.is_write_event());
//! assert_eq!(ev.as_label(), "error");
//! assert_eq!(ev.cause(), Some(&SourceError::failed("boom")));
//! ```

use crate::error::SourceError;

/// Classification of subscription events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A new read value is available on the handle.
    ValueChanged,

    /// The read connection state changed.
    ReadConnectionChanged,

    /// The write connection state changed.
    WriteConnectionChanged,

    /// The data source or a timer reported a failure.
    ///
    /// The subscription stays open; value and connection are preserved.
    Error(SourceError),

    /// A write issued through the handle completed.
    WriteSucceeded,

    /// A write issued through the handle did not complete.
    WriteFailed(SourceError),
}

impl Event {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Event::ValueChanged => "value_changed",
            Event::ReadConnectionChanged => "read_connection_changed",
            Event::WriteConnectionChanged => "write_connection_changed",
            Event::Error(_) => "error",
            Event::WriteSucceeded => "write_succeeded",
            Event::WriteFailed(_) => "write_failed",
        }
    }

    /// True for events a read-only listener receives.
    #[inline]
    pub fn is_read_event(&self) -> bool {
        matches!(
            self,
            Event::ValueChanged | Event::ReadConnectionChanged | Event::Error(_)
        )
    }

    /// True for events a write-only listener receives.
    #[inline]
    pub fn is_write_event(&self) -> bool {
        matches!(
            self,
            Event::WriteConnectionChanged
                | Event::WriteSucceeded
                | Event::WriteFailed(_)
                | Event::Error(_)
        )
    }

    /// Returns the failure cause, if any.
    #[inline]
    pub fn cause(&self) -> Option<&SourceError> {
        match self {
            Event::Error(cause) | Event::WriteFailed(cause) => Some(cause),
            _ => None,
        }
    }
}
