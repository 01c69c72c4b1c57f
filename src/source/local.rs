//! # In-process data source.
//!
//! [`LocalSource`] keeps a table of named channels in memory and fans every
//! change out to the collectors connected to that channel. Channels are
//! created on first use, disconnected and without a value.
//!
//! Collectors are always called after the table lock is released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::collectors::{PushCollector, WriteCollector};
use crate::error::SourceError;
use crate::sync::lock;

use super::{DataSource, WriteCompletion};

struct Channel<V> {
    value: Option<V>,
    connected: bool,
    readers: Vec<Arc<dyn PushCollector<V>>>,
    writers: Vec<Arc<WriteCollector>>,
}

impl<V> Default for Channel<V> {
    fn default() -> Self {
        Self {
            value: None,
            connected: false,
            readers: Vec::new(),
            writers: Vec::new(),
        }
    }
}

/// Data source backed by an in-memory channel table.
///
/// # Example
/// ```rust
/// use pvflow::LocalSource;
///
/// let source = LocalSource::<f64>::new("sim");
/// source.set("temp", 21.5);
/// assert_eq!(source.value("temp"), Some(21.5));
/// assert!(source.is_connected("temp"));
/// ```
pub struct LocalSource<V> {
    name: String,
    channels: Mutex<HashMap<String, Channel<V>>>,
}

impl<V> LocalSource<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Stores `value` on `channel`, marks it connected and notifies readers.
    pub fn set(&self, channel: &str, value: V) {
        let (readers, writers, was_connected) = {
            let mut channels = lock(&self.channels);
            let ch = channels.entry(channel.to_string()).or_default();
            let was_connected = ch.connected;
            ch.value = Some(value.clone());
            ch.connected = true;
            (ch.readers.clone(), ch.writers.clone(), was_connected)
        };
        for reader in &readers {
            if was_connected {
                reader.update_value(Some(value.clone()));
            } else {
                reader.update_value_and_connection(Some(value.clone()), true);
            }
        }
        if !was_connected {
            for writer in &writers {
                writer.update_connection(true);
            }
        }
    }

    /// Changes the connection state of `channel`.
    pub fn set_connected(&self, channel: &str, connected: bool) {
        let (readers, writers) = {
            let mut channels = lock(&self.channels);
            let ch = channels.entry(channel.to_string()).or_default();
            if ch.connected == connected {
                return;
            }
            ch.connected = connected;
            (ch.readers.clone(), ch.writers.clone())
        };
        for reader in &readers {
            reader.update_connection(connected);
        }
        for writer in &writers {
            writer.update_connection(connected);
        }
    }

    /// Reports a runtime failure on `channel` to every connected collector.
    pub fn fail(&self, channel: &str, error: SourceError) {
        let (readers, writers) = {
            let channels = lock(&self.channels);
            match channels.get(channel) {
                Some(ch) => (ch.readers.clone(), ch.writers.clone()),
                None => return,
            }
        };
        for reader in &readers {
            reader.notify_error(error.clone());
        }
        for writer in &writers {
            writer.notify_error(error.clone());
        }
    }

    /// Current value of `channel`.
    pub fn value(&self, channel: &str) -> Option<V> {
        lock(&self.channels)
            .get(channel)
            .and_then(|ch| ch.value.clone())
    }

    /// Connection state of `channel`.
    pub fn is_connected(&self, channel: &str) -> bool {
        lock(&self.channels)
            .get(channel)
            .is_some_and(|ch| ch.connected)
    }

    /// Number of read collectors connected to `channel`.
    pub fn reader_count(&self, channel: &str) -> usize {
        lock(&self.channels)
            .get(channel)
            .map_or(0, |ch| ch.readers.len())
    }
}

impl<V> DataSource<V> for LocalSource<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn connect_read(&self, channel: &str, collector: Arc<dyn PushCollector<V>>) {
        let (value, connected) = {
            let mut channels = lock(&self.channels);
            let ch = channels.entry(channel.to_string()).or_default();
            ch.readers.push(Arc::clone(&collector));
            (ch.value.clone(), ch.connected)
        };
        match (value, connected) {
            (None, false) => {}
            (None, true) => collector.update_connection(true),
            (value, connected) => collector.update_value_and_connection(value, connected),
        }
    }

    fn disconnect_read(&self, channel: &str, collector: &Arc<dyn PushCollector<V>>) {
        if let Some(ch) = lock(&self.channels).get_mut(channel) {
            ch.readers.retain(|r| !Arc::ptr_eq(r, collector));
        }
    }

    fn connect_write(&self, channel: &str, collector: Arc<WriteCollector>) {
        let connected = {
            let mut channels = lock(&self.channels);
            let ch = channels.entry(channel.to_string()).or_default();
            ch.writers.push(Arc::clone(&collector));
            ch.connected
        };
        if connected {
            collector.update_connection(true);
        }
    }

    fn disconnect_write(&self, channel: &str, collector: &Arc<WriteCollector>) {
        if let Some(ch) = lock(&self.channels).get_mut(channel) {
            ch.writers.retain(|w| !Arc::ptr_eq(w, collector));
        }
    }

    fn write(&self, channel: &str, value: V, completion: WriteCompletion) {
        if !self.is_connected(channel) {
            completion.failed(SourceError::Disconnected);
            return;
        }
        self.set(channel, value);
        completion.succeeded();
    }
}
