//! The pipeline orchestrator.
//!
//! # Run sequence
//!
//! 1. Start every stage's worker pool. No item thread exists until all pools
//!    are running, so every queue has consumers before anything is pushed.
//! 2. Spawn one thread per item. Each waits at the arrival barrier (party
//!    size = item count), then for every stage in order enters the stage
//!    queue and parks on its advance semaphore until a worker releases it.
//! 3. After its last stage an item bumps the completion count under a mutex.
//!    The thread that observes `completed == total` fires the [`OnceFlag`];
//!    only the winner announces global completion.
//! 4. Join the item threads, then stop and join the worker pools.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::events::{NoopEvents, PipelineEvents};
use super::fault::FaultSlot;
use super::item::Item;
use super::stage::{Stage, StageGate, StageSpec};
use super::watchdog::StallWatchdog;
use crate::errors::{Result, TurnstileError, panic_message};
use crate::sync::{CyclicBarrier, OnceFlag};
use crate::validation::{validate_all_positive, validate_positive};

/// Default unit of simulated work a worker spends per item.
pub const DEFAULT_WORK: Duration = Duration::from_micros(100);

/// Run-level configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    items: usize,
    work: Duration,
    stall_timeout: Option<Duration>,
}

impl PipelineConfig {
    /// Configuration for `items` items with the default work unit and no watchdog.
    #[must_use]
    pub fn new(items: usize) -> Self {
        Self { items, work: DEFAULT_WORK, stall_timeout: None }
    }

    /// Set the per-item simulated work each worker performs. Must be non-zero.
    #[must_use]
    pub fn with_work(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    /// Enable the stall watchdog with the given timeout (`None` disables it).
    #[must_use]
    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }

    #[must_use]
    pub fn items(&self) -> usize {
        self.items
    }

    #[must_use]
    pub fn work(&self) -> Duration {
        self.work
    }
}

/// Per-stage figures of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: String,
    pub workers: usize,
    /// Items serviced by this stage's workers.
    pub visits: u64,
}

/// Result of a successful [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct Outcome {
    pub items: usize,
    pub completed: usize,
    /// Whether the global completion announcement fired.
    pub announced: bool,
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
}

impl Outcome {
    /// Stage visits summed over all stages.
    #[must_use]
    pub fn total_visits(&self) -> u64 {
        self.stages.iter().map(|s| s.visits).sum()
    }
}

/// Completion tracking shared by all item threads.
struct Completion {
    total: usize,
    completed: Mutex<usize>,
    announced: OnceFlag,
}

impl Completion {
    fn new(total: usize) -> Self {
        Self { total, completed: Mutex::new(0), announced: OnceFlag::new() }
    }

    /// Count one finished item and return the new total.
    fn finish_one(&self) -> usize {
        let mut completed = self.completed.lock();
        *completed += 1;
        *completed
    }

    fn completed(&self) -> usize {
        *self.completed.lock()
    }
}

/// Everything an item thread needs.
struct ItemContext {
    barrier: CyclicBarrier,
    gates: Arc<Vec<StageGate>>,
    completion: Completion,
    events: Arc<dyn PipelineEvents>,
    faults: Arc<FaultSlot>,
}

/// A validated staged worker-pool pipeline.
///
/// Construction only validates; threads exist only for the duration of
/// [`Pipeline::run`], which may be called repeatedly.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use turnstile_lib::pipeline::{Pipeline, PipelineConfig, StageSpec};
///
/// let config = PipelineConfig::new(4).with_work(Duration::from_micros(10));
/// let stages = vec![StageSpec::new("check-in", 2), StageSpec::new("gate", 1)];
/// let outcome = Pipeline::new(config, stages).unwrap().run().unwrap();
/// assert_eq!(outcome.completed, 4);
/// assert!(outcome.announced);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    stages: Vec<StageSpec>,
    events: Arc<dyn PipelineEvents>,
}

impl Pipeline {
    /// Validate the configuration. Starts no threads.
    ///
    /// # Errors
    ///
    /// Returns [`TurnstileError::InvalidParameter`] when the item count is
    /// zero, there are no stages, any stage has zero workers, or the work
    /// unit is zero.
    pub fn new(config: PipelineConfig, stages: Vec<StageSpec>) -> Result<Self> {
        validate_positive(config.items, "items")?;
        let pools: Vec<usize> = stages.iter().map(StageSpec::workers).collect();
        validate_all_positive(&pools, "workers")?;
        if config.work.is_zero() {
            return Err(TurnstileError::InvalidParameter {
                parameter: "work".to_string(),
                reason: "Simulated work per item must be non-zero".to_string(),
            });
        }
        Ok(Self { config, stages, events: Arc::new(NoopEvents) })
    }

    /// Attach an event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn PipelineEvents>) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.config.items
    }

    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Drive every item through every stage and block until all are done.
    ///
    /// # Errors
    ///
    /// Returns an error if a thread cannot be spawned, a processing hook
    /// panicked, or an item thread panicked. If an item thread cannot be
    /// spawned, the threads already waiting at the arrival barrier can never
    /// be released and are left parked.
    pub fn run(&self) -> Result<Outcome> {
        let start = Instant::now();
        let items = self.config.items;
        let faults = Arc::new(FaultSlot::new());
        let progress = Arc::new(AtomicU64::new(0));

        // Precondition for admitting items: every worker pool is running.
        let stages = self.start_stages(&progress, &faults)?;
        let gates: Arc<Vec<StageGate>> = Arc::new(stages.iter().map(Stage::gate).collect());
        info!(
            "Started {} stage(s) with {} worker(s) for {} item(s)",
            stages.len(),
            self.stages.iter().map(StageSpec::workers).sum::<usize>(),
            items
        );

        let watchdog = match self.config.stall_timeout {
            Some(timeout) => {
                match StallWatchdog::spawn(timeout, Arc::clone(&progress), Arc::clone(&gates)) {
                    Ok(watchdog) => Some(watchdog),
                    Err(error) => {
                        stop_stages(stages);
                        return Err(error);
                    }
                }
            }
            None => None,
        };

        let ctx = Arc::new(ItemContext {
            barrier: CyclicBarrier::new(items),
            gates,
            completion: Completion::new(items),
            events: Arc::clone(&self.events),
            faults: Arc::clone(&faults),
        });

        let handles = match spawn_items(&ctx, items) {
            Ok(handles) => handles,
            Err(error) => {
                abandon_run(watchdog, stages);
                return Err(error);
            }
        };
        let mut failure = join_items(handles);

        if let Some(watchdog) = watchdog {
            watchdog.stop();
        }

        let mut reports = Vec::with_capacity(stages.len());
        for (stage, spec) in stages.into_iter().zip(&self.stages) {
            match stage.shutdown() {
                Ok(visits) => reports.push(StageReport {
                    name: spec.name().to_string(),
                    workers: spec.workers(),
                    visits,
                }),
                Err(error) => {
                    failure.get_or_insert(error);
                }
            }
        }

        // A hook panic is the root cause of anything else that went wrong.
        if let Some(error) = faults.take().or(failure) {
            return Err(error);
        }

        let outcome = Outcome {
            items,
            completed: ctx.completion.completed(),
            announced: ctx.completion.announced.has_fired(),
            stages: reports,
            elapsed: start.elapsed(),
        };
        debug!("Pipeline run finished: {outcome:?}");
        Ok(outcome)
    }

    fn start_stages(&self, progress: &Arc<AtomicU64>, faults: &Arc<FaultSlot>) -> Result<Vec<Stage>> {
        let mut stages = Vec::with_capacity(self.stages.len());
        for (index, spec) in self.stages.iter().enumerate() {
            // Room for every item plus one stop ticket per worker.
            let capacity = self.config.items + spec.workers();
            match Stage::start(index, spec, capacity, self.config.work, progress, faults) {
                Ok(stage) => stages.push(stage),
                Err(error) => {
                    stop_stages(stages);
                    return Err(error);
                }
            }
        }
        Ok(stages)
    }
}

/// Stop stages on an error path; the caller already has the error to report.
fn stop_stages(stages: Vec<Stage>) {
    for stage in stages {
        if let Err(error) = stage.shutdown() {
            warn!("Stage did not stop cleanly while abandoning the run: {error}");
        }
    }
}

/// Tear down a run that failed after its stages started: the watchdog first,
/// then every worker pool.
fn abandon_run(watchdog: Option<StallWatchdog>, stages: Vec<Stage>) {
    if let Some(watchdog) = watchdog {
        watchdog.stop();
    }
    stop_stages(stages);
}

fn spawn_items(ctx: &Arc<ItemContext>, items: usize) -> Result<Vec<JoinHandle<()>>> {
    let mut handles = Vec::with_capacity(items);
    for id in 1..=items {
        let ctx = Arc::clone(ctx);
        let name = format!("item-{id}");
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || drive_item(id, &ctx))
            .map_err(|source| TurnstileError::Spawn { name, source })?;
        handles.push(handle);
    }
    Ok(handles)
}

fn join_items(handles: Vec<JoinHandle<()>>) -> Option<TurnstileError> {
    let mut failure = None;
    for (index, handle) in handles.into_iter().enumerate() {
        if let Err(payload) = handle.join() {
            failure.get_or_insert(TurnstileError::ThreadPanicked {
                thread: format!("item-{}", index + 1),
                message: panic_message(payload.as_ref()),
            });
        }
    }
    failure
}

/// Body of an item thread: CREATED -> ARRIVED -> IN_STAGE_1..N -> DONE.
fn drive_item(id: usize, ctx: &ItemContext) {
    let item = Arc::new(Item::new(id));

    // The barrier must see every party member even if the hook panics.
    let arrival = panic::catch_unwind(AssertUnwindSafe(|| ctx.events.on_arrival(&item)));
    ctx.barrier.wait();
    if let Err(payload) = arrival {
        panic::resume_unwind(payload);
    }

    for gate in ctx.gates.iter() {
        ctx.events.on_queued(gate.index(), gate.name(), &item);
        gate.admit(Arc::clone(&item));
        item.await_release();
        if ctx.faults.is_raised() {
            return;
        }
    }

    let completed = ctx.completion.finish_one();
    ctx.events.on_finished(&item, completed);
    if completed == ctx.completion.total && ctx.completion.announced.try_fire() {
        ctx.events.on_all_finished(ctx.completion.total);
    }
}
