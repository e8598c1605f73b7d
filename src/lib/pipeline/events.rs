//! Observation hooks for pipeline runs.
//!
//! Every method has a no-op default so implementors only override what they
//! report on. Hooks run on item threads and must not block.

use super::item::Item;

/// Callbacks invoked while items move through a [`super::Pipeline`].
pub trait PipelineEvents: Send + Sync {
    /// The item's thread has started and is about to wait at the arrival barrier.
    fn on_arrival(&self, _item: &Item) {}

    /// The item is about to enter the queue of stage `stage_index`.
    fn on_queued(&self, _stage_index: usize, _stage: &str, _item: &Item) {}

    /// The item left its last stage; `completed` counts finished items so far.
    fn on_finished(&self, _item: &Item, _completed: usize) {}

    /// Every item has finished. Called exactly once per successful run.
    fn on_all_finished(&self, _total: usize) {}
}

/// Event sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl PipelineEvents for NoopEvents {}
