//! # Pending-event accumulator.
//!
//! Collector notifications land in [`Pending`] between ticks. A tick turns
//! the accumulated state into one [`Delivery`] whose events come out in a
//! fixed order:
//! ```text
//! ReadConnectionChanged → WriteConnectionChanged → ValueChanged → Error* → WriteSucceeded/WriteFailed*
//! ```
//! Connection events are computed by comparing the collectors' current
//! connection with the last delivered one, so a flap between two ticks
//! coalesces to nothing.
//!
//! Errors and write outcomes are kept in arrival order, at most
//! [`PENDING_CAPACITY`] of each; the oldest is dropped when a paused or
//! starved subscription keeps accumulating. A delivery the execution context
//! refused goes back through [`Pending::restore`], ahead of anything that
//! arrived meanwhile.

use crate::error::SourceError;
use crate::events::{Event, Notification};

/// Maximum number of errors (and, separately, write outcomes) held between
/// two deliveries.
pub(crate) const PENDING_CAPACITY: usize = 256;

/// Drops the oldest entries beyond [`PENDING_CAPACITY`].
fn keep_newest<T>(entries: &mut Vec<T>) -> usize {
    let excess = entries.len().saturating_sub(PENDING_CAPACITY);
    entries.drain(..excess);
    excess
}

/// State accumulated since the previous delivery.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    /// A value-carrying notification arrived.
    pub(crate) value: bool,
    pub(crate) errors: Vec<SourceError>,
    pub(crate) writes: Vec<Result<(), SourceError>>,
    /// Connection flags as of the last delivery.
    pub(crate) delivered_read: bool,
    pub(crate) delivered_write: bool,
}

impl Pending {
    /// Records one notification. Connection-only notifications just mark the
    /// subscription dirty; their effect is read from the collectors at tick time.
    pub(crate) fn record(&mut self, notification: Notification) {
        if notification.carries_value() {
            self.value = true;
        }
        let dropped = match notification {
            Notification::Error(err) => {
                self.errors.push(err);
                keep_newest(&mut self.errors)
            }
            Notification::WriteSucceeded => {
                self.writes.push(Ok(()));
                keep_newest(&mut self.writes)
            }
            Notification::WriteFailed(err) => {
                self.writes.push(Err(err));
                keep_newest(&mut self.writes)
            }
            _ => 0,
        };
        if dropped > 0 {
            tracing::trace!(dropped, "pending capacity reached, oldest dropped");
        }
    }

    /// Puts an undelivered delivery back, ahead of what arrived since.
    ///
    /// Connection changes it carried are reported again; its value is
    /// re-read from the collector on the next tick.
    pub(crate) fn restore<R>(&mut self, delivery: Delivery<R>) {
        if delivery.value.is_some() {
            self.value = true;
        }
        if let Some(c) = delivery.read_connected {
            self.delivered_read = !c;
        }
        if let Some(c) = delivery.write_connected {
            self.delivered_write = !c;
        }

        let mut errors = delivery.errors;
        errors.append(&mut self.errors);
        self.errors = errors;
        keep_newest(&mut self.errors);

        let mut writes = delivery.writes;
        writes.append(&mut self.writes);
        self.writes = writes;
        keep_newest(&mut self.writes);
    }

    /// Drains the accumulator into a delivery.
    ///
    /// `read` / `write` are the collectors' current connection flags (`None`
    /// when the subscription has no such side).
    pub(crate) fn take<R>(
        &mut self,
        value: Option<Option<R>>,
        read: Option<bool>,
        write: Option<bool>,
    ) -> Delivery<R> {
        self.value = false;
        let read_connected = read.filter(|c| *c != self.delivered_read);
        let write_connected = write.filter(|c| *c != self.delivered_write);
        if let Some(c) = read_connected {
            self.delivered_read = c;
        }
        if let Some(c) = write_connected {
            self.delivered_write = c;
        }
        Delivery {
            value,
            read_connected,
            write_connected,
            errors: std::mem::take(&mut self.errors),
            writes: std::mem::take(&mut self.writes),
        }
    }
}

/// One scheduler-emitted delivery: the snapshot plus its events.
#[derive(Debug)]
pub(crate) struct Delivery<R> {
    /// `Some` when the value changed (the inner `None` is the unset value).
    pub(crate) value: Option<Option<R>>,
    pub(crate) read_connected: Option<bool>,
    pub(crate) write_connected: Option<bool>,
    pub(crate) errors: Vec<SourceError>,
    pub(crate) writes: Vec<Result<(), SourceError>>,
}

impl<R> Delivery<R> {
    pub(crate) fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.read_connected.is_none()
            && self.write_connected.is_none()
            && self.errors.is_empty()
            && self.writes.is_empty()
    }

    /// Last failure carried by this delivery, if any.
    pub(crate) fn last_error(&self) -> Option<&SourceError> {
        self.writes
            .iter()
            .rev()
            .find_map(|w| w.as_ref().err())
            .or_else(|| self.errors.last())
    }

    /// Events in delivery order.
    pub(crate) fn events(&self) -> Vec<Event> {
        let mut events = Vec::with_capacity(3 + self.errors.len() + self.writes.len());
        if self.read_connected.is_some() {
            events.push(Event::ReadConnectionChanged);
        }
        if self.write_connected.is_some() {
            events.push(Event::WriteConnectionChanged);
        }
        if self.value.is_some() {
            events.push(Event::ValueChanged);
        }
        events.extend(self.errors.iter().cloned().map(Event::Error));
        events.extend(self.writes.iter().map(|w| match w {
            Ok(()) => Event::WriteSucceeded,
            Err(err) => Event::WriteFailed(err.clone()),
        }));
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_follow_fixed_order() {
        let mut p = Pending::default();
        p.record(Notification::WriteFailed(SourceError::Disconnected));
        p.record(Notification::Error(SourceError::failed("x")));
        p.record(Notification::ValueAndConnection { connected: true });
        p.record(Notification::WriteSucceeded);

        let d = p.take(Some(Some(1)), Some(true), Some(true));
        assert_eq!(
            d.events(),
            vec![
                Event::ReadConnectionChanged,
                Event::WriteConnectionChanged,
                Event::ValueChanged,
                Event::Error(SourceError::failed("x")),
                Event::WriteFailed(SourceError::Disconnected),
                Event::WriteSucceeded,
            ]
        );
        assert_eq!(d.last_error(), Some(&SourceError::Disconnected));
    }

    #[test]
    fn connection_flap_between_ticks_coalesces() {
        let mut p = Pending::default();
        p.record(Notification::ReadConnection { connected: true });
        p.record(Notification::ReadConnection { connected: false });
        let d = p.take::<u8>(None, Some(false), None);
        assert!(d.is_empty());

        p.record(Notification::ReadConnection { connected: true });
        let d = p.take::<u8>(None, Some(true), None);
        assert_eq!(d.events(), vec![Event::ReadConnectionChanged]);
        assert!(p.delivered_read);
    }

    #[test]
    fn value_flag_is_consumed() {
        let mut p = Pending::default();
        p.record(Notification::Value);
        assert!(p.value);
        let _ = p.take(Some(Some("v")), None, None);
        assert!(!p.value);
    }

    #[test]
    fn refused_delivery_is_replayed_first() {
        let mut p = Pending::default();
        p.record(Notification::ValueAndConnection { connected: true });
        p.record(Notification::Error(SourceError::failed("first")));
        let refused = p.take(Some(Some(1)), Some(true), None);

        p.record(Notification::Error(SourceError::failed("second")));
        p.restore(refused);
        assert!(p.value);
        assert!(!p.delivered_read);

        let d = p.take(Some(Some(2)), Some(true), None);
        assert_eq!(
            d.events(),
            vec![
                Event::ReadConnectionChanged,
                Event::ValueChanged,
                Event::Error(SourceError::failed("first")),
                Event::Error(SourceError::failed("second")),
            ]
        );
        assert_eq!(d.value, Some(Some(2)));
    }

    #[test]
    fn accumulation_keeps_newest_entries() {
        let mut p = Pending::default();
        for i in 0..PENDING_CAPACITY + 5 {
            p.record(Notification::Error(SourceError::failed(i.to_string())));
            p.record(Notification::WriteSucceeded);
        }
        assert_eq!(p.errors.len(), PENDING_CAPACITY);
        assert_eq!(p.writes.len(), PENDING_CAPACITY);
        assert_eq!(p.errors.first(), Some(&SourceError::failed("5")));
    }
}
