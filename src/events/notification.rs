//! # Collector-to-director notifications.
//!
//! A [`Notification`] is what a collector hands to its registered target after
//! releasing its lock. It is not consumer-visible: the director accumulates
//! notifications and the scheduler decides when they become [`Event`](super::Event)s.

use crate::error::SourceError;

/// Raw change report from a collector.
///
/// `ValueAndConnection` is emitted by a single atomic update of both fields, so
/// the director never observes the value without the matching connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The read value changed.
    Value,
    /// The read connection flag changed to `connected`.
    ReadConnection {
        /// New connection state.
        connected: bool,
    },
    /// Value and read connection changed in one critical section.
    ValueAndConnection {
        /// New connection state.
        connected: bool,
    },
    /// The write connection flag changed to `connected`.
    WriteConnection {
        /// New connection state.
        connected: bool,
    },
    /// The source reported a runtime failure.
    Error(SourceError),
    /// A write completed.
    WriteSucceeded,
    /// A write did not complete.
    WriteFailed(SourceError),
}

impl Notification {
    /// True if the notification reports a new read value.
    #[inline]
    pub fn carries_value(&self) -> bool {
        matches!(
            self,
            Notification::Value | Notification::ValueAndConnection { .. }
        )
    }

    /// Returns `Some(true)` if the notification reports a (read or write) connection.
    #[inline]
    pub fn connection(&self) -> Option<bool> {
        match self {
            Notification::ReadConnection { connected }
            | Notification::ValueAndConnection { connected }
            | Notification::WriteConnection { connected } => Some(*connected),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_update_reports_both_fields() {
        let n = Notification::ValueAndConnection { connected: true };
        assert!(n.carries_value());
        assert_eq!(n.connection(), Some(true));

        assert!(!Notification::WriteSucceeded.carries_value());
        assert_eq!(Notification::Value.connection(), None);
        assert_eq!(
            Notification::WriteConnection { connected: false }.connection(),
            Some(false)
        );
    }
}
