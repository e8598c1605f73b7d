//! Counting semaphore built from a mutex and a condition variable.
//!
//! Waiters park on the condition variable while the count is zero, so a
//! blocked [`CountingSemaphore::wait`] consumes no CPU. The mutex is released
//! while parked and re-acquired before the count is decremented.

use parking_lot::{Condvar, Mutex};

/// A classic counting semaphore.
///
/// # Example
/// ```
/// use turnstile_lib::sync::CountingSemaphore;
///
/// let sem = CountingSemaphore::new(1);
/// sem.wait(); // consumes the single permit
/// assert!(!sem.try_wait());
/// sem.post();
/// assert_eq!(sem.available(), 1);
/// ```
#[derive(Debug)]
pub struct CountingSemaphore {
    count: Mutex<usize>,
    available: Condvar,
}

impl CountingSemaphore {
    /// Create a semaphore holding `initial` permits.
    #[must_use]
    pub fn new(initial: usize) -> Self {
        Self { count: Mutex::new(initial), available: Condvar::new() }
    }

    /// Release one permit and wake a single waiter, if any.
    ///
    /// # Panics
    ///
    /// Panics if the count would overflow `usize`, which can only happen when
    /// permits are posted without ever being consumed.
    pub fn post(&self) {
        let mut count = self.count.lock();
        *count = match count.checked_add(1) {
            Some(next) => next,
            None => panic!("invariant violation: semaphore count overflow"),
        };
        drop(count);
        self.available.notify_one();
    }

    /// Block until a permit is available, then consume it.
    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.available.wait(&mut count);
        }
        *count -= 1;
    }

    /// Consume a permit if one is available, without blocking.
    pub fn try_wait(&self) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    /// Snapshot of the number of permits currently available.
    #[must_use]
    pub fn available(&self) -> usize {
        *self.count.lock()
    }
}

impl Default for CountingSemaphore {
    fn default() -> Self {
        Self::new(0)
    }
}
