#![deny(unsafe_code)]
// Clippy lint configuration for CI
// These lints are allowed because:
// - cast_*: counts are moved between usize and u64 for reporting
// - missing_*_doc: Documentation improvements tracked separately
// - needless_pass_by_value: Some APIs designed for ownership transfer
// - items_after_statements: Some test code uses late item declarations
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::needless_pass_by_value,
    clippy::items_after_statements,
    clippy::uninlined_format_args
)]

//! # turnstile - staged worker-pool pipelines
//!
//! This library drives a fixed population of items through an ordered series
//! of processing stages, each served by its own pool of worker threads, and
//! announces exactly once when every item is done.
//!
//! ## Overview
//!
//! ### Core Functionality
//!
//! - **[`pipeline`]** - The staged pipeline: stage specs, the orchestrator and run outcomes
//! - **[`sync`]** - Blocking primitives the pipeline is built from (semaphore, barrier,
//!   once-flag, bounded queues)
//!
//! ### Companion Programs
//!
//! - **[`buffer`]** - Bounded-buffer producer/consumer
//! - **[`day_cycle`]** - Two-thread day cycle handing children over through a ready queue
//!
//! ### Utilities
//!
//! - **[`validation`]** - Parameter validation with consistent error messages
//! - **[`logging`]** - Formatting helpers and run summaries
//! - **[`errors`]** - The crate error type
//!
//! ## Quick Start
//!
//! ```
//! use std::time::Duration;
//! use turnstile_lib::pipeline::{Pipeline, PipelineConfig, StageSpec};
//!
//! # fn main() -> turnstile_lib::errors::Result<()> {
//! let config = PipelineConfig::new(12).with_work(Duration::from_micros(10));
//! let stages = vec![
//!     StageSpec::new("baggage", 2),
//!     StageSpec::new("security", 3),
//!     StageSpec::new("boarding", 1),
//! ];
//! let outcome = Pipeline::new(config, stages)?.run()?;
//! assert_eq!(outcome.completed, 12);
//! assert_eq!(outcome.total_visits(), 36);
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod day_cycle;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod sync;
pub mod validation;

pub use errors::{Result, TurnstileError};
