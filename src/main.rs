#![deny(unsafe_code)]
pub mod commands;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Custom styles for CLI help output
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());
use commands::airline::Airline;
use commands::buffer::Buffer;
use commands::command::Command;
use commands::day_cycle::DayCycle;
use commands::pipeline::RunPipeline;
use anyhow::Result;
use enum_dispatch::enum_dispatch;
use env_logger::Env;
use log::info;
use turnstile_lib::TurnstileError;

/// Exit status for invalid parameters, matching clap's usage errors.
const EXIT_CONFIGURATION: i32 = 2;
/// Exit status for any other failure.
const EXIT_FAILURE: i32 = 1;

#[derive(Parser, Debug)]
#[command(styles = STYLES)]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[enum_dispatch(Command)]
#[derive(Parser, Debug)]
#[command(version)]
enum Subcommand {
    // Pipeline
    #[command(display_order = 1)]
    Pipeline(RunPipeline),

    // Scenarios
    #[command(display_order = 2)]
    Airline(Airline),
    #[command(display_order = 3)]
    Buffer(Buffer),
    #[command(display_order = 4)]
    DayCycle(DayCycle),
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<TurnstileError>() {
        Some(e) if e.is_configuration() => EXIT_CONFIGURATION,
        _ => EXIT_FAILURE,
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let command_line = std::env::args().collect::<Vec<_>>().join(" ");

    // Usage errors exit with status 2.
    let args = Args::try_parse().unwrap_or_else(|e| e.exit());

    info!("Running turnstile version {}", env!("CARGO_PKG_VERSION"));
    if let Err(error) = args.subcommand.execute(&command_line) {
        eprintln!("Error: {error:?}");
        std::process::exit(exit_code(&error));
    }
}
