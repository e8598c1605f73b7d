//! Mother and Father caring for the children over several days.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use turnstile_lib::day_cycle::{DayCycleConfig, DayEvent, DayEvents, run_day_cycle};
use turnstile_lib::logging::{format_count, format_duration};

use crate::commands::command::Command;

/// Run the two-parent day cycle.
#[derive(Debug, Parser)]
#[command(
    name = "day-cycle",
    about = "\x1b[38;5;72m[SCENARIOS]\x1b[0m      \x1b[36mMother and Father hand children over through a ready queue\x1b[0m",
    long_about = r#"
Run the Mother Hubbard day cycle.

Each day Mother wakes the children, feeds them breakfast, sends them to
school, gives them dinner and bathes them, one chore at a time for every
child. Each bathed child is handed to Father, who reads it a book and tucks
it into bed. When every child is in bed Father ends the day and wakes
Mother for the next one.

Example usage:
  turnstile day-cycle --days 3
  turnstile day-cycle --days 2 --children 4 --delay-micros 0
"#
)]
pub struct DayCycle {
    /// Number of days to run
    #[arg(short = 'd', long = "days")]
    pub days: usize,

    /// Number of children
    #[arg(short = 'c', long = "children", default_value = "12")]
    pub children: usize,

    /// Microseconds spent on each chore
    #[arg(long = "delay-micros", default_value = "100")]
    pub delay_micros: u64,
}

struct Diary;

impl DayEvents for Diary {
    fn on_event(&self, event: &DayEvent) {
        info!("{event}");
    }
}

impl Command for DayCycle {
    fn execute(&self, command_line: &str) -> Result<()> {
        debug!("Command line: {command_line}");
        info!("Starting DayCycle");
        info!("Days: {}, children: {}", self.days, self.children);

        let config = DayCycleConfig::new(self.days)
            .with_children(self.children)
            .with_chore_delay(Duration::from_micros(self.delay_micros));
        let report = run_day_cycle(&config, Arc::new(Diary))?;

        info!(
            "Finished after {} day(s): {} chores in {}.",
            report.days,
            format_count(report.chores),
            format_duration(report.elapsed)
        );
        Ok(())
    }
}
