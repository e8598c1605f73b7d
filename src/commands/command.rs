//! Command trait definition for CLI commands.
//!
//! Every turnstile subcommand implements [`Command`]; dispatch over the
//! subcommand enum goes through `enum_dispatch`.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// Trait implemented by all turnstile CLI commands.
///
/// The `command_line` parameter contains the full invocation, logged at
/// debug level for reproducibility.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
