//! Bounded batch buffer.
//!
//! Ordered accumulator owned by a single dispatcher. Items only leave
//! through [`BatchBuffer::drain`], which empties the buffer completely.

use std::fmt;

use contracts::Task;

use crate::error::DispatcherError;

/// Fixed-capacity, arrival-ordered task buffer
pub struct BatchBuffer {
    items: Vec<Task>,
    capacity: usize,
}

impl fmt::Debug for BatchBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchBuffer")
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl BatchBuffer {
    /// Create a buffer holding at most `capacity` tasks
    ///
    /// # Errors
    /// `InvalidCapacity` when `capacity == 0`
    pub fn new(capacity: usize) -> Result<Self, DispatcherError> {
        if capacity == 0 {
            return Err(DispatcherError::InvalidCapacity { capacity });
        }
        Ok(Self {
            items: Vec::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a task at the tail
    ///
    /// Callers flush before appending to a full buffer; a full buffer is
    /// left untouched and reported as `BufferOverflow`.
    #[inline]
    pub fn append(&mut self, task: Task) -> Result<(), DispatcherError> {
        if self.is_full() {
            return Err(DispatcherError::BufferOverflow {
                len: self.items.len(),
                capacity: self.capacity,
            });
        }
        self.items.push(task);
        Ok(())
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take every buffered task in arrival order, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<Task> {
        std::mem::replace(&mut self.items, Vec::with_capacity(self.capacity))
    }

    /// Buffered tasks, oldest first
    pub fn items(&self) -> &[Task] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(i: u32) -> Task {
        Task::new(format!("Task{i}"), i)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = BatchBuffer::new(0).unwrap_err();
        assert!(matches!(err, DispatcherError::InvalidCapacity { capacity: 0 }));
    }

    #[test]
    fn test_fill_and_drain() {
        let mut buffer = BatchBuffer::new(3).unwrap();
        assert!(buffer.is_empty());

        buffer.append(task(1)).unwrap();
        buffer.append(task(2)).unwrap();
        assert!(!buffer.is_full());
        assert_eq!(buffer.len(), 2);

        buffer.append(task(3)).unwrap();
        assert!(buffer.is_full());

        let drained = buffer.drain();
        let kinds: Vec<_> = drained.iter().map(|t| t.kind().to_string()).collect();
        assert_eq!(kinds, vec!["Task1", "Task2", "Task3"]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn test_append_on_full_is_rejected() {
        let mut buffer = BatchBuffer::new(1).unwrap();
        buffer.append(task(1)).unwrap();

        let err = buffer.append(task(2)).unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::BufferOverflow {
                len: 1,
                capacity: 1
            }
        ));
        assert_eq!(buffer.items(), &[task(1)]);
    }

    #[test]
    fn test_drain_empty() {
        let mut buffer = BatchBuffer::new(2).unwrap();
        assert!(buffer.drain().is_empty());
        assert!(buffer.is_empty());
    }
}
