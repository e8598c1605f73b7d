//! Logging helpers for formatted output.
//!
//! Consistent formatting of counts, durations and rates, plus the summary
//! blocks printed at the end of a run.

use std::time::{Duration, Instant};

use crate::pipeline::Outcome;

/// Formats a count with thousands separators.
///
/// # Examples
///
/// ```
/// use turnstile_lib::logging::format_count;
///
/// assert_eq!(format_count(1234567), "1,234,567");
/// assert_eq!(format_count(123), "123");
/// ```
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a percentage with specified decimal places.
///
/// # Examples
///
/// ```
/// use turnstile_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration in human-readable form.
///
/// Sub-second durations are shown in milliseconds, since most runs finish
/// well under a second.
///
/// # Examples
///
/// ```
/// use turnstile_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// assert_eq!(format_duration(Duration::from_secs(5400)), "1h 30m");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a rate (items per second) with appropriate units.
///
/// # Examples
///
/// ```
/// use turnstile_lib::logging::format_rate;
/// use std::time::Duration;
///
/// assert_eq!(format_rate(1000, Duration::from_secs(1)), "1,000 items/s");
/// assert_eq!(format_rate(30, Duration::from_secs(60)), "30.0 items/min");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} items/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} items/s", format_count(rate as u64))
    } else {
        let items_per_min = count as f64 / (secs / 60.0);
        format!("{items_per_min:.1} items/min")
    }
}

/// Logs a formatted summary of a finished pipeline run.
#[allow(clippy::cast_precision_loss)]
pub fn log_pipeline_summary(outcome: &Outcome) {
    log::info!("Pipeline Summary:");
    log::info!("  Items: {}", format_count(outcome.items as u64));
    log::info!("  Completed: {}", format_count(outcome.completed as u64));
    log::info!("  Announced: {}", if outcome.announced { "yes" } else { "no" });

    let total = outcome.total_visits();
    for (index, stage) in outcome.stages.iter().enumerate() {
        let share = if total == 0 { 0.0 } else { stage.visits as f64 / total as f64 };
        log::info!(
            "  Stage {} '{}': {} worker(s), {} visit(s) ({} of all visits)",
            index + 1,
            stage.name,
            stage.workers,
            format_count(stage.visits),
            format_percent(share, 1)
        );
    }
    log::info!(
        "  Elapsed: {} ({})",
        format_duration(outcome.elapsed),
        format_rate(outcome.completed as u64, outcome.elapsed)
    );
}

/// Operation timing and summary helper.
///
/// ```no_run
/// use turnstile_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Boarding passengers");
/// // ... do work ...
/// timer.log_completion(120);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Logs the completion with item count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.start_time.elapsed();
        log::info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
