//! # Growable FIFO Queue
//!
//! The buffer behind a queue-backed [`Mailbox`](crate::Mailbox). It is a plain
//! data structure with no synchronization: the mailbox worker is its only owner.
//!
//! Storage at least doubles when full and halves when occupancy drops to a
//! quarter of capacity, never below the configured minimum. Both directions are
//! amortized O(1) and never reorder elements.

use std::collections::VecDeque;
use tracing::trace;

/// Growable/shrinkable FIFO buffer with a capacity floor.
#[derive(Debug)]
pub struct Queue<T> {
    buf: VecDeque<T>,
    min_capacity: usize,
}

impl<T> Queue<T> {
    /// Creates a queue with room for `max(capacity, min_capacity)` elements.
    ///
    /// A `min_capacity` of zero is treated as one.
    pub fn new(capacity: usize, min_capacity: usize) -> Self {
        let min_capacity = min_capacity.max(1);
        Self {
            buf: VecDeque::with_capacity(capacity.max(min_capacity)),
            min_capacity,
        }
    }

    /// Appends a value at the back.
    pub fn push_back(&mut self, value: T) {
        let capacity = self.buf.capacity();
        if self.buf.len() == capacity {
            let target = (capacity * 2).max(self.min_capacity);
            self.buf.reserve_exact(target - self.buf.len());
            trace!(from = capacity, to = self.buf.capacity(), "Queue grown");
        }
        self.buf.push_back(value);
    }

    /// Removes and returns the front value, or `None` if the queue is empty.
    pub fn pop_front(&mut self) -> Option<T> {
        let value = self.buf.pop_front()?;

        let capacity = self.buf.capacity();
        if capacity > self.min_capacity && self.buf.len() <= capacity / 4 {
            self.buf.shrink_to((capacity / 2).max(self.min_capacity));
            trace!(from = capacity, to = self.buf.capacity(), "Queue shrunk");
        }
        Some(value)
    }

    /// The value that the next [`Queue::pop_front`] would return.
    pub fn front(&self) -> Option<&T> {
        self.buf.front()
    }

    /// `true` when no values are queued.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Current size of the backing storage.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Floor the storage never shrinks below.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = Queue::new(0, 2);
        for i in 0..10 {
            queue.push_back(i);
        }
        assert_eq!(queue.front(), Some(&0));
        assert_eq!(queue.len(), 10);

        let drained: Vec<_> = std::iter::from_fn(|| queue.pop_front()).collect();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_empty_queue() {
        let mut queue: Queue<u8> = Queue::new(4, 4);
        assert!(queue.is_empty());
        assert_eq!(queue.front(), None);
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_grows_at_least_double() {
        let mut queue = Queue::new(4, 4);
        let initial = queue.capacity();
        for i in 0..initial {
            queue.push_back(i);
        }
        queue.push_back(initial);
        assert!(queue.capacity() >= initial * 2);
    }

    #[test]
    fn test_shrinks_but_not_below_minimum() {
        let mut queue = Queue::new(0, 8);
        for i in 0..1000 {
            queue.push_back(i);
        }
        let grown = queue.capacity();
        assert!(grown >= 1000);

        for i in 0..1000 {
            assert_eq!(queue.pop_front(), Some(i));
            assert!(queue.capacity() >= queue.min_capacity());
        }
        assert!(queue.is_empty());
        assert!(queue.capacity() >= 8);
        assert!(queue.capacity() < grown);
    }

    #[test]
    fn test_interleaved_push_pop_keeps_order() {
        let mut queue = Queue::new(2, 2);
        let mut next_in = 0;
        let mut next_out = 0;
        for round in 0..50 {
            for _ in 0..round % 7 + 1 {
                queue.push_back(next_in);
                next_in += 1;
            }
            for _ in 0..round % 5 {
                if let Some(value) = queue.pop_front() {
                    assert_eq!(value, next_out);
                    next_out += 1;
                }
            }
        }
        while let Some(value) = queue.pop_front() {
            assert_eq!(value, next_out);
            next_out += 1;
        }
        assert_eq!(next_in, next_out);
    }

    #[test]
    fn test_zero_minimum_is_clamped() {
        let queue: Queue<()> = Queue::new(0, 0);
        assert_eq!(queue.min_capacity(), 1);
        assert!(queue.capacity() >= 1);
    }
}
