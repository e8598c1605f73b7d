//! The airport boarding scenario.
//!
//! Passengers arrive at the terminal, wait until everyone has arrived, then
//! pass through baggage processing, security screening and boarding, each
//! staffed by its own pool of workers. The plane takes off once the last
//! passenger is seated.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use turnstile_lib::pipeline::{Item, PipelineEvents, StageSpec};

use crate::commands::command::Command;
use crate::commands::common::{WatchdogOptions, WorkOptions, run_pipeline};

/// What a passenger waits for at each stage, by stage index.
const WAITING_FOR: [&str; 3] = [
    "waiting at baggage processing for a handler",
    "waiting to be screened by a screener",
    "waiting to board the plane by an attendant",
];

/// Board an airplane: baggage, security and boarding worker pools.
#[derive(Debug, Parser)]
#[command(
    name = "airline",
    about = "\x1b[38;5;72m[SCENARIOS]\x1b[0m      \x1b[36mBoard passengers through baggage, security and boarding\x1b[0m",
    long_about = r#"
Simulate boarding a flight.

Every passenger is driven by its own thread. Passengers wait at the terminal
until all of them have arrived, then each one passes, in order, through:

  1. baggage processing, served by the baggage handlers
  2. security screening, served by the screeners
  3. boarding, served by the flight attendants

Each stage has a FIFO queue; any idle worker of that stage takes the next
passenger. The plane takes off exactly once, after the last passenger is seated.

Example usage:
  turnstile airline --passengers 100 --handlers 3 --screeners 5 --attendants 2
  turnstile airline -p 12 -b 2 -s 3 -f 1 --stall-timeout 5
"#
)]
pub struct Airline {
    /// Number of passengers
    #[arg(short = 'p', long = "passengers")]
    pub passengers: usize,

    /// Number of baggage handlers
    #[arg(short = 'b', long = "handlers")]
    pub handlers: usize,

    /// Number of security screeners
    #[arg(short = 's', long = "screeners")]
    pub screeners: usize,

    /// Number of flight attendants
    #[arg(short = 'f', long = "attendants")]
    pub attendants: usize,

    #[command(flatten)]
    pub work: WorkOptions,

    #[command(flatten)]
    pub watchdog: WatchdogOptions,
}

/// Narrates passenger progress at info level.
struct Terminal;

impl PipelineEvents for Terminal {
    fn on_arrival(&self, item: &Item) {
        info!("Passenger #{} arrived at the terminal.", item.id());
    }

    fn on_queued(&self, stage_index: usize, stage: &str, item: &Item) {
        match WAITING_FOR.get(stage_index) {
            Some(waiting) => info!("Passenger #{} is {waiting}.", item.id()),
            None => info!("Passenger #{} is waiting for {stage}.", item.id()),
        }
    }

    fn on_finished(&self, item: &Item, _completed: usize) {
        info!("Passenger #{} has been seated and relaxes.", item.id());
    }

    fn on_all_finished(&self, total: usize) {
        info!("*** All {total} passengers are seated. The plane takes off! ***");
    }
}

impl Airline {
    fn stages(&self) -> Vec<StageSpec> {
        vec![
            StageSpec::new("baggage", self.handlers).with_process(|p: &Item| {
                info!("Passenger #{} is being processed by a baggage handler.", p.id());
            }),
            StageSpec::new("security", self.screeners).with_process(|p: &Item| {
                info!("Passenger #{} is being screened by a security screener.", p.id());
            }),
            StageSpec::new("boarding", self.attendants).with_process(|p: &Item| {
                info!("Passenger #{} is being seated by a flight attendant.", p.id());
            }),
        ]
    }
}

impl Command for Airline {
    fn execute(&self, command_line: &str) -> Result<()> {
        debug!("Command line: {command_line}");
        info!("Starting Airline");
        info!("Passengers: {}", self.passengers);
        info!(
            "Handlers: {}, screeners: {}, attendants: {}",
            self.handlers, self.screeners, self.attendants
        );

        run_pipeline(self.passengers, self.stages(), &self.work, &self.watchdog, Arc::new(Terminal))?;
        info!("All passenger threads completed. Exiting.");
        Ok(())
    }
}
