//! Integration tests for turnstile.
//!
//! These tests drive complete pipeline runs through the public library API
//! and run the `turnstile` binary end to end.

mod test_buffer_command;
mod test_pipeline_commands;
mod test_pipeline_scenarios;
mod test_sync_primitives;
