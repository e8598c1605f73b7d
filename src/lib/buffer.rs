//! Bounded-buffer producer/consumer.
//!
//! One producer thread generates the letters `A..=Z` (wrapping back to `A`)
//! into a [`BlockingBuffer`]; one consumer thread removes and uses them. Both
//! stop after the configured total. The producer parks while the buffer is
//! full and the consumer parks while it is empty, so the buffer never holds
//! more than its capacity.

use log::{debug, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::errors::{Result, TurnstileError, panic_message};
use crate::sync::BlockingBuffer;
use crate::validation::validate_positive;

/// Default number of items transferred.
pub const DEFAULT_TOTAL: usize = 20;
/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 5;
/// Default pause after each produce or consume.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

/// The `index`-th produced letter, counting from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn letter(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

#[derive(Debug, Clone)]
pub struct BufferConfig {
    total: usize,
    capacity: usize,
    delay: Duration,
}

impl BufferConfig {
    #[must_use]
    pub fn new(total: usize, capacity: usize) -> Self {
        Self { total, capacity, delay: DEFAULT_DELAY }
    }

    /// Pause each thread for `delay` after every operation. Zero disables it.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn validate(&self) -> Result<()> {
        validate_positive(self.total, "total")?;
        validate_positive(self.capacity, "capacity")
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL, DEFAULT_CAPACITY)
    }
}

/// Callbacks for producer/consumer progress. Invoked on the worker threads.
pub trait BufferEvents: Send + Sync {
    /// `item` was added; `produced` counts items so far and `buffered` is the
    /// buffer length right after the insert.
    fn on_produced(&self, _item: char, _produced: usize, _buffered: usize) {}

    /// `item` was removed and used; `consumed` counts items so far.
    fn on_consumed(&self, _item: char, _consumed: usize) {}
}

impl BufferEvents for crate::pipeline::NoopEvents {}

#[derive(Debug, Clone)]
pub struct BufferReport {
    pub produced: usize,
    /// Items in the order the consumer used them.
    pub consumed: Vec<char>,
    /// Highest buffer length observed right after an insert.
    pub peak: usize,
    pub elapsed: Duration,
}

/// Run one producer and one consumer to completion.
///
/// The producer closes the stream with an end marker, even after a panic, and
/// a consumer that panics keeps draining until it sees that marker. Neither
/// thread can be left parked when the other one fails.
///
/// # Errors
///
/// Returns [`TurnstileError::InvalidParameter`] for a zero total or capacity,
/// and a thread error if either thread cannot start or panics.
pub fn run_producer_consumer(
    config: &BufferConfig,
    events: Arc<dyn BufferEvents>,
) -> Result<BufferReport> {
    config.validate()?;
    let start = Instant::now();
    // `None` marks the end of the stream.
    let buffer: Arc<BlockingBuffer<Option<char>>> = Arc::new(BlockingBuffer::new(config.capacity));
    let abandoned = Arc::new(AtomicBool::new(false));

    let producer = {
        let buffer = Arc::clone(&buffer);
        let abandoned = Arc::clone(&abandoned);
        let events = Arc::clone(&events);
        let (total, delay) = (config.total, config.delay);
        spawn("producer", move || {
            let mut peak = 0usize;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                for index in 0..total {
                    if abandoned.load(Ordering::Acquire) {
                        break;
                    }
                    let item = letter(index);
                    let buffered = buffer.push(Some(item));
                    peak = peak.max(buffered);
                    events.on_produced(item, index + 1, buffered);
                    pause(delay);
                }
            }));
            buffer.push(None);
            outcome.map(|()| peak)
        })?
    };

    let consumer = {
        let buffer = Arc::clone(&buffer);
        let abandoned = Arc::clone(&abandoned);
        let (total, delay) = (config.total, config.delay);
        spawn("consumer", move || {
            let mut used = Vec::with_capacity(total);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                while let Some(item) = buffer.pop() {
                    used.push(item);
                    events.on_consumed(item, used.len());
                    pause(delay);
                }
            }));
            if outcome.is_err() {
                abandon(&abandoned, &buffer);
            }
            outcome.map(|()| used)
        })
    };
    let consumer = match consumer {
        Ok(handle) => handle,
        Err(error) => {
            // Stand in for the missing consumer until the producer gives up.
            abandon(&abandoned, &buffer);
            if let Err(producer_error) = join("producer", producer) {
                warn!("Producer failed while abandoning the transfer: {producer_error}");
            }
            return Err(error);
        }
    };

    let produced = join("producer", producer);
    let consumed = join("consumer", consumer);
    let (peak, consumed) = (produced?, consumed?);
    debug!("Transferred {} item(s) with peak occupancy {peak}", consumed.len());

    Ok(BufferReport { produced: config.total, consumed, peak, elapsed: start.elapsed() })
}

/// Tell the producer to stop and discard items until its end marker.
fn abandon(abandoned: &AtomicBool, buffer: &BlockingBuffer<Option<char>>) {
    abandoned.store(true, Ordering::Release);
    while buffer.pop().is_some() {}
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

fn spawn<T, F>(name: &str, body: F) -> Result<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|source| TurnstileError::Spawn { name: name.to_string(), source })
}

fn join<T>(name: &str, handle: JoinHandle<thread::Result<T>>) -> Result<T> {
    handle.join().and_then(|outcome| outcome).map_err(|payload| TurnstileError::ThreadPanicked {
        thread: name.to_string(),
        message: panic_message(payload.as_ref()),
    })
}
