//! Bounded-buffer producer/consumer demonstration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use turnstile_lib::buffer::{BufferConfig, BufferEvents, run_producer_consumer};
use turnstile_lib::logging::{format_count, format_duration};

use crate::commands::command::Command;

/// Move letters from a producer to a consumer through a bounded buffer.
#[derive(Debug, Parser)]
#[command(
    name = "buffer",
    about = "\x1b[38;5;72m[SCENARIOS]\x1b[0m      \x1b[36mProducer/consumer over a bounded buffer\x1b[0m",
    long_about = r#"
Run one producer and one consumer over a bounded buffer.

The producer generates the letters A to Z, wrapping back to A, and blocks
while the buffer is full. The consumer removes and prints them, blocking
while the buffer is empty. Both stop after --total items.

Example usage:
  turnstile buffer
  turnstile buffer --total 100 --capacity 3 --delay-ms 0
"#
)]
pub struct Buffer {
    /// Number of items to produce and consume
    #[arg(short = 't', long = "total", default_value = "20")]
    pub total: usize,

    /// Maximum number of items held by the buffer
    #[arg(short = 'c', long = "capacity", default_value = "5")]
    pub capacity: usize,

    /// Milliseconds each thread pauses after every operation
    #[arg(short = 'd', long = "delay-ms", default_value = "200")]
    pub delay_ms: u64,
}

struct Console;

impl BufferEvents for Console {
    fn on_produced(&self, item: char, produced: usize, _buffered: usize) {
        info!("Produced: {item} (Total produced: {produced})");
    }

    fn on_consumed(&self, item: char, _consumed: usize) {
        info!("Consumed: {item}");
    }
}

impl Command for Buffer {
    fn execute(&self, command_line: &str) -> Result<()> {
        debug!("Command line: {command_line}");
        info!("Starting Buffer");
        info!("Total: {}, capacity: {}, delay: {}ms", self.total, self.capacity, self.delay_ms);

        let config = BufferConfig::new(self.total, self.capacity)
            .with_delay(Duration::from_millis(self.delay_ms));
        let report = run_producer_consumer(&config, Arc::new(Console))?;

        info!(
            "{} items produced and consumed in {} (peak buffer occupancy {}). Exiting program.",
            format_count(report.consumed.len() as u64),
            format_duration(report.elapsed),
            report.peak
        );
        Ok(())
    }
}
