//! # Tracing listener for debugging and demos.
//!
//! [`LogListener`] renders every event with `tracing::info!`.
//!
//! ## Output format
//! ```text
//! INFO pvflow: value_changed pv="temp" value=Some(21.5)
//! INFO pvflow: read_connection_changed pv="temp" connected=true
//! INFO pvflow: error pv="temp" cause="Connection timeout (no connection after 50ms)"
//! INFO pvflow: write_failed pv="temp" cause="channel disconnected"
//! ```

use std::fmt::Debug;

use crate::core::Pv;
use crate::events::Event;

use super::Listener;

/// Logging listener.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// implement a custom [`Listener`] for structured handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl<R, V> Listener<R, V> for LogListener
where
    R: Clone + Debug + Send + Sync + 'static,
    V: Send + 'static,
{
    fn on_event(&self, event: &Event, pv: &Pv<R, V>) {
        let label = event.as_label();
        match event {
            Event::ValueChanged => {
                tracing::info!(pv = pv.name(), value = ?pv.latest_value(), "{label}");
            }
            Event::ReadConnectionChanged => {
                tracing::info!(pv = pv.name(), connected = pv.is_read_connected(), "{label}");
            }
            Event::WriteConnectionChanged => {
                tracing::info!(pv = pv.name(), connected = pv.is_write_connected(), "{label}");
            }
            Event::Error(cause) | Event::WriteFailed(cause) => {
                tracing::info!(pv = pv.name(), cause = %cause, "{label}");
            }
            Event::WriteSucceeded => {
                tracing::info!(pv = pv.name(), "{label}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
