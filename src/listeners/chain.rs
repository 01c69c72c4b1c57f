//! # Ordered listener chain.
//!
//! An explicit list of listener handles invoked in registration order.
//! Failures are isolated per invocation: a panicking listener is logged and
//! the next one still runs.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state
//! inconsistent if a listener panics while holding a lock.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::core::Pv;
use crate::events::Event;
use crate::sync::panic_message;

use super::Listener;

/// Listeners of one subscription, in registration order.
pub struct ListenerChain<R, V> {
    listeners: Vec<Arc<dyn Listener<R, V>>>,
}

impl<R, V> Default for ListenerChain<R, V> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<R, V> ListenerChain<R, V> {
    /// Creates a chain from listeners in registration order.
    pub fn new(listeners: Vec<Arc<dyn Listener<R, V>>>) -> Self {
        Self { listeners }
    }

    /// Appends a listener at the end of the chain.
    pub fn push(&mut self, listener: Arc<dyn Listener<R, V>>) {
        self.listeners.push(listener);
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listener names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    /// Invokes every listener with `event`, checking `is_open` right before
    /// each invocation. Returns `false` if the chain was cut short.
    pub(crate) fn dispatch(
        &self,
        event: &Event,
        pv: &Pv<R, V>,
        is_open: impl Fn() -> bool,
    ) -> bool {
        for listener in &self.listeners {
            if !is_open() {
                return false;
            }
            if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| listener.on_event(event, pv)))
            {
                tracing::warn!(
                    listener = listener.name(),
                    event = event.as_label(),
                    panic = %panic_message(&*panic_err),
                    "listener panicked"
                );
            }
        }
        true
    }
}

impl<R, V> std::fmt::Debug for ListenerChain<R, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
