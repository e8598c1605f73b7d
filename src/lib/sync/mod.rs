//! Blocking synchronization primitives.
//!
//! Everything here parks on `parking_lot` condition variables; none of the
//! waits poll or spin.
//!
//! - [`CountingSemaphore`]: post/wait permits
//! - [`CyclicBarrier`]: reusable all-arrive rendezvous
//! - [`OnceFlag`]: atomic single-fire gate
//! - [`BoundedQueue`] / [`BlockingBuffer`]: bounded FIFOs over a [`RingBuffer`]

pub mod barrier;
pub mod once_flag;
pub mod queue;
pub mod ring;
pub mod semaphore;

pub use barrier::{BarrierWaitResult, CyclicBarrier};
pub use once_flag::OnceFlag;
pub use queue::{BlockingBuffer, BoundedQueue};
pub use ring::RingBuffer;
pub use semaphore::CountingSemaphore;
