//! Stall detection for pipeline runs.
//!
//! A monitor thread samples the run's progress counter (completed stage
//! visits). When the counter has not moved for the configured timeout it logs
//! a warning with the depth of every stage queue, once per stall. Nothing is
//! recovered automatically: all waits in the pipeline are unbounded, so the
//! watchdog only diagnoses.

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::stage::StageGate;
use crate::errors::{Result, TurnstileError};
use crate::logging::format_duration;

/// Upper bound on the sampling period.
const MAX_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Handle to a running monitor thread.
pub(crate) struct StallWatchdog {
    signal: Arc<StopSignal>,
    handle: JoinHandle<()>,
}

impl StallWatchdog {
    pub(crate) fn spawn(
        timeout: Duration,
        progress: Arc<AtomicU64>,
        gates: Arc<Vec<StageGate>>,
    ) -> Result<Self> {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);
        let handle = thread::Builder::new()
            .name("stall-watchdog".to_string())
            .spawn(move || monitor(timeout, &progress, &gates, &thread_signal))
            .map_err(|source| TurnstileError::Spawn { name: "stall-watchdog".to_string(), source })?;
        Ok(Self { signal, handle })
    }

    /// Stop the monitor and wait for it to exit.
    pub(crate) fn stop(self) {
        *self.signal.stopped.lock() = true;
        self.signal.wake.notify_all();
        if self.handle.join().is_err() {
            warn!("Stall watchdog panicked");
        }
    }
}

fn monitor(timeout: Duration, progress: &AtomicU64, gates: &[StageGate], signal: &StopSignal) {
    let interval = (timeout / 4).clamp(Duration::from_millis(1), MAX_SAMPLE_INTERVAL);
    let mut last_seen = progress.load(Ordering::Acquire);
    let mut last_change = Instant::now();
    let mut warned = false;

    loop {
        {
            let mut stopped = signal.stopped.lock();
            if !*stopped {
                signal.wake.wait_for(&mut stopped, interval);
            }
            if *stopped {
                break;
            }
        }

        let current = progress.load(Ordering::Acquire);
        if current != last_seen {
            last_seen = current;
            last_change = Instant::now();
            warned = false;
            continue;
        }

        let idle = last_change.elapsed();
        if idle >= timeout && !warned {
            warned = true;
            warn!(
                "No stage has finished an item for {} ({} stage visits so far)",
                format_duration(idle),
                current
            );
            for gate in gates {
                warn!("  stage {} '{}': {} queued", gate.index() + 1, gate.name(), gate.queued());
            }
        }
    }
    debug!("Stall watchdog exiting after {last_seen} stage visits");
}
