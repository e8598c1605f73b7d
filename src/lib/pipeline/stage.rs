//! One pipeline phase: a bounded queue drained by a fixed pool of workers.
//!
//! Workers loop on [`BoundedQueue::pop`], run the stage's processing hook,
//! spend the configured unit of simulated work, then release the item back
//! to its owner. They stay alive for the whole run and exit only when they
//! pop a stop ticket, which the orchestrator enqueues once all items are
//! done (one ticket per worker).

use log::{debug, error, warn};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::fault::FaultSlot;
use super::item::Item;
use crate::errors::{Result, TurnstileError, panic_message};
use crate::sync::BoundedQueue;

/// Per-stage processing hook. Opaque, side-effect only.
pub type ProcessFn = Arc<dyn Fn(&Item) + Send + Sync>;

/// Declarative description of a stage: its name, pool size and hook.
#[derive(Clone)]
pub struct StageSpec {
    name: String,
    workers: usize,
    process: ProcessFn,
}

impl StageSpec {
    /// A stage whose processing hook does nothing.
    #[must_use]
    pub fn new(name: impl Into<String>, workers: usize) -> Self {
        Self { name: name.into(), workers, process: Arc::new(|_: &Item| {}) }
    }

    /// Replace the processing hook.
    #[must_use]
    pub fn with_process<F>(mut self, process: F) -> Self
    where
        F: Fn(&Item) + Send + Sync + 'static,
    {
        self.process = Arc::new(process);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl fmt::Debug for StageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageSpec")
            .field("name", &self.name)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// What a worker pops from its stage queue.
pub(crate) enum Ticket {
    Serve(Arc<Item>),
    Stop,
}

/// The item-facing side of a running stage.
#[derive(Clone)]
pub(crate) struct StageGate {
    index: usize,
    name: Arc<str>,
    queue: Arc<BoundedQueue<Ticket>>,
}

impl StageGate {
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Hand `item` to whichever worker of this stage is idle next.
    pub(crate) fn admit(&self, item: Arc<Item>) {
        self.queue.push(Ticket::Serve(item));
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }
}

/// A stage whose worker pool is running.
pub(crate) struct Stage {
    gate: StageGate,
    visits: Arc<AtomicU64>,
    workers: Vec<JoinHandle<()>>,
}

struct WorkerContext {
    stage: Arc<str>,
    worker: usize,
    queue: Arc<BoundedQueue<Ticket>>,
    process: ProcessFn,
    work: Duration,
    visits: Arc<AtomicU64>,
    progress: Arc<AtomicU64>,
    faults: Arc<FaultSlot>,
}

impl Stage {
    /// Spawn the stage's worker pool.
    ///
    /// `capacity` must cover every item that can be queued at once plus one
    /// stop ticket per worker. If a worker cannot be spawned, the workers
    /// already running are stopped before the error is returned.
    pub(crate) fn start(
        index: usize,
        spec: &StageSpec,
        capacity: usize,
        work: Duration,
        progress: &Arc<AtomicU64>,
        faults: &Arc<FaultSlot>,
    ) -> Result<Self> {
        let name: Arc<str> = Arc::from(spec.name());
        let queue = Arc::new(BoundedQueue::new(capacity));
        let visits = Arc::new(AtomicU64::new(0));
        let mut stage = Stage {
            gate: StageGate { index, name: Arc::clone(&name), queue: Arc::clone(&queue) },
            visits: Arc::clone(&visits),
            workers: Vec::with_capacity(spec.workers()),
        };

        debug!("Starting {} worker(s) for stage '{}'", spec.workers(), name);
        for worker in 0..spec.workers() {
            let ctx = WorkerContext {
                stage: Arc::clone(&name),
                worker,
                queue: Arc::clone(&queue),
                process: Arc::clone(&spec.process),
                work,
                visits: Arc::clone(&visits),
                progress: Arc::clone(progress),
                faults: Arc::clone(faults),
            };
            let thread_name = format!("{name}-{worker}");
            match thread::Builder::new().name(thread_name.clone()).spawn(move || run_worker(ctx)) {
                Ok(handle) => stage.workers.push(handle),
                Err(source) => {
                    // The spawn error takes precedence over any shutdown failure.
                    if let Err(error) = stage.shutdown() {
                        warn!("Stage '{name}' did not stop cleanly after a spawn failure: {error}");
                    }
                    return Err(TurnstileError::Spawn { name: thread_name, source });
                }
            }
        }
        Ok(stage)
    }

    pub(crate) fn gate(&self) -> StageGate {
        self.gate.clone()
    }

    /// Stop every worker and wait for them to exit.
    ///
    /// Must only be called once no item can still be admitted, otherwise a
    /// stop ticket could overtake a queued item.
    pub(crate) fn shutdown(self) -> Result<u64> {
        for _ in 0..self.workers.len() {
            self.gate.queue.push(Ticket::Stop);
        }

        let mut failure = None;
        for (worker, handle) in self.workers.into_iter().enumerate() {
            if let Err(payload) = handle.join() {
                let thread = format!("{}-{worker}", self.gate.name);
                error!("Worker thread {thread} panicked during execution");
                failure.get_or_insert(TurnstileError::ThreadPanicked {
                    thread,
                    message: panic_message(payload.as_ref()),
                });
            }
        }

        debug!("Stage '{}' stopped", self.gate.name);
        match failure {
            Some(error) => Err(error),
            None => Ok(self.visits.load(Ordering::Acquire)),
        }
    }
}

fn run_worker(ctx: WorkerContext) {
    loop {
        let item = match ctx.queue.pop() {
            Ticket::Serve(item) => item,
            Ticket::Stop => break,
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (ctx.process)(&item))) {
            let message = panic_message(payload.as_ref());
            error!(
                "Stage '{}' worker {} panicked on item #{}: {}",
                ctx.stage,
                ctx.worker,
                item.id(),
                message
            );
            ctx.faults.record(TurnstileError::WorkerPanicked {
                stage: ctx.stage.to_string(),
                item: item.id(),
                message,
            });
        }

        thread::sleep(ctx.work);
        ctx.visits.fetch_add(1, Ordering::AcqRel);
        ctx.progress.fetch_add(1, Ordering::Release);

        // Always release, even after a panic, so the owner never parks forever.
        item.release();
    }
    debug!("Stage '{}' worker {} exiting", ctx.stage, ctx.worker);
}
