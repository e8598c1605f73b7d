//! Single-fire gate for one-time actions raced by many threads.

use std::sync::atomic::{AtomicBool, Ordering};

/// An atomic flag that can be fired exactly once.
///
/// Exactly one caller of [`OnceFlag::try_fire`] observes `true`; every other
/// caller, concurrent or later, observes `false`. Never blocks.
#[derive(Debug, Default)]
pub struct OnceFlag {
    fired: AtomicBool,
}

impl OnceFlag {
    /// A flag that has not fired yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { fired: AtomicBool::new(false) }
    }

    /// Transition false -> true. Returns whether this call did the transition.
    pub fn try_fire(&self) -> bool {
        self.fired.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    /// Whether some caller has already fired the flag.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
