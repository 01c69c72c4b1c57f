use crate::core::{Pv, PvReader, PvWriter};
use crate::events::Event;

/// Full listener contract.
///
/// Called on the subscription's execution context, never concurrently with
/// another event of the same subscription. A panic is caught and logged; the
/// remaining listeners of the chain still run.
pub trait Listener<R, V>: Send + Sync {
    /// Handles one event. Read the state from `pv`.
    fn on_event(&self, event: &Event, pv: &Pv<R, V>);

    /// Returns the listener name used in logs.
    ///
    /// The default uses `type_name::<Self>()`; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<R, V, F> Listener<R, V> for F
where
    F: Fn(&Event, &Pv<R, V>) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event, pv: &Pv<R, V>) {
        self(event, pv)
    }
}

/// Listener interested only in the read side.
///
/// Receives `ValueChanged`, `ReadConnectionChanged` and `Error`.
pub trait ReadListener<R>: Send + Sync + 'static {
    /// Handles one read event.
    fn on_read_event(&self, event: &Event, pv: &dyn PvReader<R>);
}

impl<R, F> ReadListener<R> for F
where
    F: Fn(&Event, &dyn PvReader<R>) + Send + Sync + 'static,
{
    fn on_read_event(&self, event: &Event, pv: &dyn PvReader<R>) {
        self(event, pv)
    }
}

/// Listener interested only in the write side.
///
/// Receives `WriteConnectionChanged`, `WriteSucceeded`, `WriteFailed` and `Error`.
pub trait WriteListener<V>: Send + Sync + 'static {
    /// Handles one write event.
    fn on_write_event(&self, event: &Event, pv: &dyn PvWriter<V>);
}

impl<V, F> WriteListener<V> for F
where
    F: Fn(&Event, &dyn PvWriter<V>) + Send + Sync + 'static,
{
    fn on_write_event(&self, event: &Event, pv: &dyn PvWriter<V>) {
        self(event, pv)
    }
}

/// Adapter merging a [`ReadListener`] into the full contract.
pub struct ReadOnly<L>(pub L);

impl<R, V, L> Listener<R, V> for ReadOnly<L>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
    L: ReadListener<R>,
{
    fn on_event(&self, event: &Event, pv: &Pv<R, V>) {
        if event.is_read_event() {
            self.0.on_read_event(event, pv);
        }
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<L>()
    }
}

/// Adapter merging a [`WriteListener`] into the full contract.
pub struct WriteOnly<L>(pub L);

impl<R, V, L> Listener<R, V> for WriteOnly<L>
where
    R: Clone + Send + Sync + 'static,
    V: Send + 'static,
    L: WriteListener<V>,
{
    fn on_event(&self, event: &Event, pv: &Pv<R, V>) {
        if event.is_write_event() {
            self.0.on_write_event(event, pv);
        }
    }

    fn name(&self) -> &'static str {
        std::any::type_name::<L>()
    }
}
