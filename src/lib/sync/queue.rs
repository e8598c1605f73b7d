//! Bounded FIFO queues shared between producer and consumer threads.
//!
//! # Key Types
//!
//! - [`BoundedQueue`]: non-blocking push, blocking pop. Capacity is a sizing
//!   contract: callers size it to the known upper bound of queued elements,
//!   so a push into a full queue is a programming error and panics.
//! - [`BlockingBuffer`]: classic bounded buffer where push also blocks while
//!   the buffer is full (paired `empty`/`full` semaphores).
//!
//! Both keep element storage under a `parking_lot::Mutex` and track element
//! availability with a [`CountingSemaphore`], so blocked callers park instead
//! of spinning and the lock is never held across a wait.

use parking_lot::Mutex;

use super::ring::RingBuffer;
use super::semaphore::CountingSemaphore;

/// Thread-safe FIFO with blocking pop and capacity-checked push.
///
/// # Example
/// ```
/// use turnstile_lib::sync::BoundedQueue;
///
/// let queue = BoundedQueue::new(2);
/// queue.push(1);
/// queue.push(2);
/// assert_eq!(queue.try_push(3), Err(3));
/// assert_eq!(queue.pop(), 1);
/// assert_eq!(queue.pop(), 2);
/// ```
#[derive(Debug)]
pub struct BoundedQueue<T> {
    ring: Mutex<RingBuffer<T>>,
    items: CountingSemaphore,
}

impl<T> BoundedQueue<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self { ring: Mutex::new(RingBuffer::with_capacity(capacity)), items: CountingSemaphore::new(0) }
    }

    /// Enqueue `item` and wake one blocked popper.
    ///
    /// # Panics
    ///
    /// Panics with a capacity violation if the queue is full. Capacity is
    /// sized to the population that can ever be queued at once; reaching it
    /// means the caller's sizing is wrong, so the element is never dropped.
    pub fn push(&self, item: T) {
        if self.try_push(item).is_err() {
            panic!("capacity violation: push into a full queue (capacity {})", self.capacity());
        }
    }

    /// Enqueue `item` unless the queue is full, in which case it is returned.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        self.ring.lock().push_back(item)?;
        self.items.post();
        Ok(())
    }

    /// Block until an element is available, then remove the oldest one.
    ///
    /// # Panics
    ///
    /// Panics if the availability count and the ring disagree, which would
    /// mean the queue's internal invariant was broken.
    pub fn pop(&self) -> T {
        self.items.wait();
        match self.ring.lock().pop_front() {
            Some(item) => item,
            None => panic!("invariant violation: queue signalled an element but the ring is empty"),
        }
    }

    /// Remove the oldest element if one is available, without blocking.
    pub fn try_pop(&self) -> Option<T> {
        if !self.items.try_wait() {
            return None;
        }
        self.ring.lock().pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }
}

/// Bounded buffer whose producers block while it is full.
#[derive(Debug)]
pub struct BlockingBuffer<T> {
    ring: Mutex<RingBuffer<T>>,
    /// Free slots; producers wait here.
    empty: CountingSemaphore,
    /// Filled slots; consumers wait here.
    full: CountingSemaphore,
}

impl<T> BlockingBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(RingBuffer::with_capacity(capacity)),
            empty: CountingSemaphore::new(capacity),
            full: CountingSemaphore::new(0),
        }
    }

    /// Block until a slot is free, then append `item`.
    ///
    /// Returns the number of elements buffered right after the insert.
    ///
    /// # Panics
    ///
    /// Panics if a free slot was signalled but the ring is full.
    pub fn push(&self, item: T) -> usize {
        self.empty.wait();
        let len = {
            let mut ring = self.ring.lock();
            if ring.push_back(item).is_err() {
                panic!("invariant violation: buffer signalled a free slot but the ring is full");
            }
            ring.len()
        };
        self.full.post();
        len
    }

    /// Block until an element is buffered, then remove the oldest one.
    ///
    /// # Panics
    ///
    /// Panics if an element was signalled but the ring is empty.
    pub fn pop(&self) -> T {
        self.full.wait();
        let item = match self.ring.lock().pop_front() {
            Some(item) => item,
            None => panic!("invariant violation: buffer signalled an element but the ring is empty"),
        };
        self.empty.post();
        item
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.lock().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }
}
