//! First-error-wins slot shared by the threads of one run.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::TurnstileError;

#[derive(Debug, Default)]
pub(crate) struct FaultSlot {
    raised: AtomicBool,
    error: Mutex<Option<TurnstileError>>,
}

impl FaultSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store `error` unless an earlier one is already held.
    pub(crate) fn record(&self, error: TurnstileError) {
        let mut slot = self.error.lock();
        if slot.is_none() {
            *slot = Some(error);
            self.raised.store(true, Ordering::Release);
        }
    }

    pub(crate) fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    pub(crate) fn take(&self) -> Option<TurnstileError> {
        self.error.lock().take()
    }
}
