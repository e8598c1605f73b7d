//! The unit of work that travels through the pipeline.

use crate::sync::CountingSemaphore;

/// An item (passenger) driven through the stages by its own thread.
///
/// The advance semaphore hands control back to the owning thread: the owner
/// waits on it after entering a stage queue, and only the worker currently
/// servicing the item posts it.
#[derive(Debug)]
pub struct Item {
    id: usize,
    advance: CountingSemaphore,
}

impl Item {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self { id, advance: CountingSemaphore::new(0) }
    }

    /// 1-based identity of the item within its run.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Let the owner proceed to its next stage.
    pub(crate) fn release(&self) {
        self.advance.post();
    }

    /// Park the owner until the servicing worker releases the item.
    pub(crate) fn await_release(&self) {
        self.advance.wait();
    }
}
