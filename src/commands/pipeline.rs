//! Run an arbitrary staged pipeline from the command line.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use turnstile_lib::pipeline::{Item, PipelineEvents, StageSpec};

use crate::commands::command::Command;
use crate::commands::common::{WatchdogOptions, WorkOptions, run_pipeline};

/// Run N items through a pipeline with the given pool sizes.
#[derive(Debug, Parser)]
#[command(
    name = "pipeline",
    about = "\x1b[38;5;30m[PIPELINE]\x1b[0m       \x1b[36mRun items through stages with the given worker pools\x1b[0m",
    long_about = r#"
Run a generic staged worker-pool pipeline.

One stage is created per entry of --workers, in order, named stage-1,
stage-2, ... Each item is driven by its own thread, waits at the arrival
barrier for every other item, then visits every stage exactly once.

Example usage:
  turnstile pipeline --items 100 --workers 2,3,1
  turnstile pipeline -n 1000 -w 8 --work-micros 50
"#
)]
pub struct RunPipeline {
    /// Number of items
    #[arg(short = 'n', long = "items")]
    pub items: usize,

    /// Worker pool size of each stage, in stage order
    #[arg(short = 'w', long = "workers", value_delimiter = ',', num_args = 1..)]
    pub workers: Vec<usize>,

    #[command(flatten)]
    pub work: WorkOptions,

    #[command(flatten)]
    pub watchdog: WatchdogOptions,
}

/// Logs item progress at debug level and the final announcement at info.
struct ProgressEvents;

impl PipelineEvents for ProgressEvents {
    fn on_queued(&self, stage_index: usize, stage: &str, item: &Item) {
        debug!("Item #{} entered stage {} '{stage}'", item.id(), stage_index + 1);
    }

    fn on_finished(&self, item: &Item, completed: usize) {
        debug!("Item #{} finished ({completed} done)", item.id());
    }

    fn on_all_finished(&self, total: usize) {
        info!("All {total} items finished every stage");
    }
}

impl Command for RunPipeline {
    fn execute(&self, command_line: &str) -> Result<()> {
        debug!("Command line: {command_line}");
        info!("Starting Pipeline");
        info!("Items: {}", self.items);

        let stages = self
            .workers
            .iter()
            .enumerate()
            .map(|(index, &workers)| StageSpec::new(format!("stage-{}", index + 1), workers))
            .collect();
        run_pipeline(self.items, stages, &self.work, &self.watchdog, Arc::new(ProgressEvents))?;
        Ok(())
    }
}
