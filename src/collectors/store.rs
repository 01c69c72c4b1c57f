//! # Storage policies for read collectors.
//!
//! A [`CollectorStore`] decides what a [`ReadCollector`](super::ReadCollector)
//! keeps between two reads:
//! - [`LatestValue`] the most recent value only (side-effect-free read)
//! - [`ValueQueue`]  every value since the last read, bounded (draining read)

use std::collections::VecDeque;

/// Storage policy of a read collector.
///
/// Called with the collector lock held: implementations must not block.
pub trait CollectorStore: Send + 'static {
    /// Type written by the data source.
    type Input: Send + 'static;
    /// Type returned to the reader.
    type Output;

    /// Records a pushed value (`None` = unset).
    fn push(&mut self, value: Option<Self::Input>);

    /// Produces the value seen by a reader.
    fn read(&mut self) -> Self::Output;
}

/// Keeps the latest pushed value. "No value yet" is `None`.
#[derive(Debug, Clone)]
pub struct LatestValue<T> {
    value: Option<T>,
}

impl<T> Default for LatestValue<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> CollectorStore for LatestValue<T>
where
    T: Clone + Send + 'static,
{
    type Input = T;
    type Output = Option<T>;

    fn push(&mut self, value: Option<T>) {
        self.value = value;
    }

    fn read(&mut self) -> Option<T> {
        self.value.clone()
    }
}

/// Bounded FIFO of every value pushed since the last read.
///
/// - `read` drains the queue.
/// - When full, the oldest value is discarded.
/// - `None` pushes carry no value and are not stored.
#[derive(Debug, Clone)]
pub struct ValueQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> ValueQueue<T> {
    /// Creates a queue holding at most `capacity` values (min 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Maximum number of retained values.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> CollectorStore for ValueQueue<T>
where
    T: Send + 'static,
{
    type Input = T;
    type Output = Vec<T>;

    fn push(&mut self, value: Option<T>) {
        let Some(value) = value else { return };
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    fn read(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }
}
