// vbot_sim/src/simulation/core/queue.rs

use std::collections::VecDeque;

/// Bounded FIFO between two pipeline stages.
///
/// When full, pushing evicts the oldest entry. A consumer that only cares
/// about the most recent data drains with [`TickQueue::pop_latest`].
#[derive(Debug, Clone)]
pub struct TickQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    dropped: usize,
}

impl<T> TickQueue<T> {
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Appends `item`, returning the evicted entry if the queue was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.dropped += 1;
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Empties the queue and returns its newest entry.
    ///
    /// The older entries are discarded and counted in [`TickQueue::dropped`].
    pub fn pop_latest(&mut self) -> Option<T> {
        let latest = self.items.pop_back()?;
        self.dropped += self.items.len();
        self.items.clear();
        Some(latest)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries evicted on overflow or skipped by `pop_latest` since creation.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
