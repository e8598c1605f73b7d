//! CLI command implementations for turnstile.
//!
//! Each submodule implements one subcommand.
//!
//! # Command Categories
//!
//! ## Pipeline
//! - [`pipeline`] - Run a generic staged worker-pool pipeline
//!
//! ## Scenarios
//! - [`airline`] - Board passengers through baggage, security and boarding
//! - [`buffer`] - Producer/consumer over a bounded buffer
//! - [`day_cycle`] - Mother and Father hand children over through a ready queue

#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::uninlined_format_args
)]

pub mod airline;
pub mod buffer;
pub mod command;
pub mod common;
pub mod day_cycle;
pub mod pipeline;
