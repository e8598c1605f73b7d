//! Stage hooks that record where every item is while it is being processed.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use turnstile_lib::pipeline::{Item, StageSpec};

/// Shared record of item positions and per-stage concurrency.
pub struct Occupancy {
    /// Stage number (1-based) an item is currently in, 0 when between stages.
    position: Vec<AtomicUsize>,
    /// Last stage number each item finished.
    last_stage: Vec<AtomicUsize>,
    /// Items currently inside each stage's hook.
    active: Vec<AtomicUsize>,
    /// Highest value `active` reached per stage.
    peak: Vec<AtomicUsize>,
    /// Each (item, stage) visit.
    visits: Vec<AtomicUsize>,
    stages: usize,
    violations: AtomicUsize,
}

impl Occupancy {
    pub fn new(items: usize, stages: usize) -> Arc<Self> {
        let counters = |n: usize| (0..n).map(|_| AtomicUsize::new(0)).collect::<Vec<_>>();
        Arc::new(Self {
            position: counters(items + 1),
            last_stage: counters(items + 1),
            active: counters(stages),
            peak: counters(stages),
            visits: counters((items + 1) * stages),
            stages,
            violations: AtomicUsize::new(0),
        })
    }

    /// Build one tracking stage per entry of `pools`.
    pub fn stages(this: &Arc<Self>, pools: &[usize], hold: Duration) -> Vec<StageSpec> {
        pools
            .iter()
            .enumerate()
            .map(|(index, &workers)| {
                let tracker = Arc::clone(this);
                StageSpec::new(format!("stage-{}", index + 1), workers)
                    .with_process(move |item: &Item| tracker.visit(index, item, hold))
            })
            .collect()
    }

    fn visit(&self, stage: usize, item: &Item, hold: Duration) {
        let id = item.id();
        let number = stage + 1;
        if self.position[id].compare_exchange(0, number, Ordering::AcqRel, Ordering::Acquire).is_err()
        {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        if self.last_stage[id].swap(number, Ordering::AcqRel) != stage {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
        self.visits[id * self.stages + stage].fetch_add(1, Ordering::SeqCst);

        let now = self.active[stage].fetch_add(1, Ordering::SeqCst) + 1;
        self.peak[stage].fetch_max(now, Ordering::SeqCst);
        if !hold.is_zero() {
            thread::sleep(hold);
        }
        self.active[stage].fetch_sub(1, Ordering::SeqCst);
        self.position[id].store(0, Ordering::Release);
    }

    /// Overlapping or out-of-order stage visits observed.
    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }

    /// Peak number of items processed at once in `stage` (0-based).
    pub fn peak(&self, stage: usize) -> usize {
        self.peak[stage].load(Ordering::SeqCst)
    }

    /// Asserts every item 1..=items visited every stage exactly once.
    pub fn assert_each_visited_once(&self, items: usize) {
        for id in 1..=items {
            for stage in 0..self.stages {
                let visits = self.visits[id * self.stages + stage].load(Ordering::SeqCst);
                assert_eq!(visits, 1, "item {id} visited stage {} {visits} time(s)", stage + 1);
            }
            assert_eq!(self.last_stage[id].load(Ordering::SeqCst), self.stages, "item {id}");
        }
    }
}
