//! Common CLI options shared across commands.
//!
//! Argument groups here are composed into command structs with
//! `#[command(flatten)]`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use log::info;

use turnstile_lib::logging::{OperationTimer, format_duration, log_pipeline_summary};
use turnstile_lib::pipeline::{Outcome, Pipeline, PipelineConfig, PipelineEvents, StageSpec};
use turnstile_lib::validation::validate_positive;

/// Simulated work performed by every pipeline worker.
#[derive(Debug, Clone, Args)]
pub struct WorkOptions {
    /// Microseconds of simulated work a worker spends on each item
    #[arg(long = "work-micros", default_value = "100")]
    pub work_micros: u64,
}

impl Default for WorkOptions {
    fn default() -> Self {
        Self { work_micros: 100 }
    }
}

impl WorkOptions {
    /// The work unit as a duration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the work unit is zero.
    pub fn work(&self) -> Result<Duration> {
        validate_positive(self.work_micros, "work-micros")?;
        Ok(Duration::from_micros(self.work_micros))
    }
}

/// Optional stall detection.
#[derive(Debug, Clone, Default, Args)]
pub struct WatchdogOptions {
    /// Warn when no stage finishes an item for this many seconds
    #[arg(long = "stall-timeout")]
    pub stall_timeout: Option<u64>,
}

impl WatchdogOptions {
    /// # Errors
    ///
    /// Returns a configuration error if a zero timeout was given.
    pub fn timeout(&self) -> Result<Option<Duration>> {
        match self.stall_timeout {
            Some(secs) => {
                validate_positive(secs, "stall-timeout")?;
                Ok(Some(Duration::from_secs(secs)))
            }
            None => Ok(None),
        }
    }
}

/// Build, run and summarize a pipeline.
pub fn run_pipeline(
    items: usize,
    stages: Vec<StageSpec>,
    work: &WorkOptions,
    watchdog: &WatchdogOptions,
    events: Arc<dyn PipelineEvents>,
) -> Result<Outcome> {
    let config =
        PipelineConfig::new(items).with_work(work.work()?).with_stall_timeout(watchdog.timeout()?);
    let pipeline = Pipeline::new(config, stages)?.with_events(events);

    for (index, spec) in pipeline.stages().iter().enumerate() {
        info!("Stage {}: {} ({} worker(s))", index + 1, spec.name(), spec.workers());
    }
    if let Some(timeout) = watchdog.timeout()? {
        info!("Stall watchdog: {}", format_duration(timeout));
    }

    let timer = OperationTimer::new("Running pipeline");
    let outcome = pipeline.run()?;
    timer.log_completion(outcome.completed as u64);
    log_pipeline_summary(&outcome);
    Ok(outcome)
}
