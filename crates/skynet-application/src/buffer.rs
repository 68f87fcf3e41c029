use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Bounded FIFO shared between threads.
///
/// `push` never blocks: once full, the oldest element is dropped to make room.
pub struct Buffer<T> {
    capacity: NonZeroUsize,
    items: Mutex<VecDeque<T>>,
    ready: Condvar,
}

impl<T> Buffer<T> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity.get())),
            ready: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Appends `item`, returning the element evicted to make room, if any.
    pub fn push(&self, item: T) -> Option<T> {
        let mut items = self.lock();
        let evicted = if items.len() >= self.capacity.get() {
            items.pop_front()
        } else {
            None
        };
        items.push_back(item);
        drop(items);
        self.ready.notify_one();
        evicted
    }

    /// Removes the oldest element, waiting up to `timeout` (forever when
    /// `None`) for one to arrive.
    pub fn pop(&self, timeout: Option<Duration>) -> Option<T> {
        let items = self.lock();
        let mut items = match timeout {
            None => self
                .ready
                .wait_while(items, |items| items.is_empty())
                .unwrap_or_else(std::sync::PoisonError::into_inner),
            Some(timeout) => {
                self.ready
                    .wait_timeout_while(items, timeout, |items| items.is_empty())
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .0
            }
        };
        items.pop_front()
    }

    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
