//! Staged worker-pool pipeline.
//!
//! A fixed population of items, each driven by its own thread, passes through
//! an ordered list of stages. Every stage owns a bounded FIFO queue and a
//! fixed pool of long-lived workers. Items are released together by an
//! arrival barrier, visit every stage exactly once in order, and are never
//! serviced by more than one stage at a time. The last item to finish
//! triggers a single global completion announcement.
//!
//! ```text
//!  item threads ──barrier──> [queue 1] ─ W1 workers ─> [queue 2] ─ W2 workers ─> ... ─> done
//!        ^                        │                        │
//!        └──── advance semaphore ─┴────────────────────────┘
//! ```
//!
//! Observation is done through [`PipelineEvents`]; per-stage work is attached
//! with [`StageSpec::with_process`].

mod events;
mod fault;
mod item;
mod orchestrator;
mod stage;
mod watchdog;

pub use events::{NoopEvents, PipelineEvents};
pub use item::Item;
pub use orchestrator::{DEFAULT_WORK, Outcome, Pipeline, PipelineConfig, StageReport};
pub use stage::{ProcessFn, StageSpec};
