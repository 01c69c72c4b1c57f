//! # Write collector: connection and outcome mailbox of the write side.
//!
//! The data source reports write connectivity and the outcome of each write
//! through a [`WriteCollector`]. The same lock discipline as the read side
//! applies: notify only after the lock is released.

use std::sync::Mutex;

use crate::error::SourceError;
use crate::events::Notification;
use crate::sync::lock;

use super::collector::{Collector, NotificationTarget};

struct State {
    connected: bool,
    target: Option<NotificationTarget>,
}

/// Thread-safe mailbox for one write channel.
pub struct WriteCollector {
    state: Mutex<State>,
}

impl Default for WriteCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteCollector {
    /// Creates a disconnected write collector.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                connected: false,
                target: None,
            }),
        }
    }

    fn publish(&self, connected: Option<bool>, notification: Notification) {
        let target = {
            let mut state = lock(&self.state);
            if let Some(connected) = connected {
                state.connected = connected;
            }
            state.target.clone()
        };
        if let Some(target) = target {
            target(notification);
        }
    }

    /// Updates the write connection flag.
    pub fn update_connection(&self, connected: bool) {
        self.publish(
            Some(connected),
            Notification::WriteConnection { connected },
        );
    }

    /// Reports that a write completed.
    pub fn write_succeeded(&self) {
        self.publish(None, Notification::WriteSucceeded);
    }

    /// Reports that a write did not complete.
    pub fn write_failed(&self, error: SourceError) {
        self.publish(None, Notification::WriteFailed(error));
    }

    /// Forwards a runtime failure of the write channel.
    pub fn notify_error(&self, error: SourceError) {
        self.publish(None, Notification::Error(error));
    }
}

impl Collector for WriteCollector {
    fn set_notification_target(&self, target: Option<NotificationTarget>) {
        lock(&self.state).target = target;
    }

    fn connection(&self) -> bool {
        lock(&self.state).connected
    }
}
