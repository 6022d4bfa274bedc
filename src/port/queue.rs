// src/port/queue.rs
//! Bounded input queues attached to ports with the `has-queue` flag.
//!
//! Grounded on spec.md §4.5: a FIFO variant (oldest dropped on overflow,
//! `Dequeue` pops one locked value) and a dequeue-all variant (same overflow
//! policy, `DequeueAll` drains everything at once). Expressed as a tagged
//! variant (`QueueKind`) held by value inside the port, per §9's guidance to
//! avoid a dynamic-dispatch inheritance tree for the cheap-copy/standard ×
//! bounded/queue combinations.

use std::collections::VecDeque;

/// One value captured by an input queue, paired with the timestamp it was
/// published with.
#[derive(Clone, Debug)]
pub struct QueueEntry<T> {
    pub value: T,
    pub timestamp: u64,
}

/// A bounded FIFO or dequeue-all queue of port values.
///
/// `max == 0` means unbounded.
pub struct InputQueue<T> {
    entries: VecDeque<QueueEntry<T>>,
    max: usize,
    dequeue_all: bool,
}

impl<T> InputQueue<T> {
    /// Creates a FIFO queue with the given bound (`0` = unbounded).
    pub fn fifo(max: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max,
            dequeue_all: false,
        }
    }

    /// Creates a dequeue-all queue with the given bound.
    pub fn dequeue_all(max: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max,
            dequeue_all: true,
        }
    }

    /// Whether this queue was configured as dequeue-all (vs. single FIFO pop).
    pub fn is_dequeue_all(&self) -> bool {
        self.dequeue_all
    }

    /// Appends a value, dropping the oldest entry first if at capacity.
    pub fn enqueue(&mut self, value: T, timestamp: u64) {
        if self.max > 0 && self.entries.len() >= self.max {
            self.entries.pop_front();
        }
        self.entries.push_back(QueueEntry { value, timestamp });
    }

    /// Pops the single oldest entry. Intended for FIFO queues; callers should
    /// check [`Self::is_dequeue_all`] and use [`Self::drain_all`] instead for
    /// dequeue-all queues (`PortError::WrongQueueMode`).
    pub fn dequeue_single(&mut self) -> Option<QueueEntry<T>> {
        self.entries.pop_front()
    }

    /// Drains every queued entry in insertion (oldest-first) order.
    pub fn drain_all(&mut self) -> Vec<QueueEntry<T>> {
        self.entries.drain(..).collect()
    }

    /// Number of entries currently queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_overflow_drops_oldest() {
        let mut q = InputQueue::fifo(3);
        for v in 1..=4 {
            q.enqueue(v, v as u64);
        }
        let mut popped = Vec::new();
        while let Some(e) = q.dequeue_single() {
            popped.push(e.value);
        }
        assert_eq!(popped, vec![2, 3, 4]);
    }

    #[test]
    fn dequeue_all_overflow_drops_oldest() {
        let mut q = InputQueue::dequeue_all(3);
        for v in 1..=4 {
            q.enqueue(v, v as u64);
        }
        let all: Vec<i32> = q.drain_all().into_iter().map(|e| e.value).collect();
        assert_eq!(all, vec![2, 3, 4]);
        assert!(q.is_empty());
    }
}
