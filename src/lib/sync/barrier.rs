//! Reusable cyclic barrier.
//!
//! A fixed-size party of threads rendezvous at [`CyclicBarrier::wait`]. The
//! thread that completes the party advances the generation counter and wakes
//! every waiter of that generation. Waiters compare against the generation
//! they arrived in, so a thread that arrives after a release always waits for
//! the next full party instead of slipping through.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
}

/// Rendezvous point for a fixed number of threads, reusable across cycles.
#[derive(Debug)]
pub struct CyclicBarrier {
    party_size: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

/// Result of a [`CyclicBarrier::wait`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    generation: u64,
}

impl BarrierWaitResult {
    /// True for exactly one thread per cycle: the one that completed the party.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// The generation this thread was released from (0 for the first cycle).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl CyclicBarrier {
    /// Create a barrier for `party_size` threads.
    ///
    /// # Panics
    ///
    /// Panics if `party_size` is zero; such a barrier could never release.
    #[must_use]
    pub fn new(party_size: usize) -> Self {
        assert!(party_size > 0, "barrier party size must be at least 1");
        Self {
            party_size,
            state: Mutex::new(BarrierState { arrived: 0, generation: 0 }),
            released: Condvar::new(),
        }
    }

    /// Block until `party_size` threads have called `wait` in this generation.
    ///
    /// # Panics
    ///
    /// Panics if the arrival count ever exceeds the party size.
    pub fn wait(&self) -> BarrierWaitResult {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.arrived += 1;
        assert!(
            state.arrived <= self.party_size,
            "invariant violation: barrier overrun ({} arrivals for a party of {})",
            state.arrived,
            self.party_size
        );

        if state.arrived == self.party_size {
            state.arrived = 0;
            state.generation += 1;
            drop(state);
            self.released.notify_all();
            return BarrierWaitResult { leader: true, generation };
        }

        while state.generation == generation {
            self.released.wait(&mut state);
        }
        BarrierWaitResult { leader: false, generation }
    }

    /// Number of threads that must arrive before the barrier releases.
    #[must_use]
    pub fn party_size(&self) -> usize {
        self.party_size
    }

    /// Number of completed cycles.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Threads currently parked in the open cycle.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.state.lock().arrived
    }
}
