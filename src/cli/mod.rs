//! Command-line interface for modsync
//!
//! Argument parsing, command handlers, and terminal progress rendering.
//! Everything here is presentation: the engine under `crate::app` never
//! prints, prompts, or exits.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{Cli, Commands, GlobalArgs};
pub use commands::{handle_check, handle_setup, handle_sync};
pub use progress::ProgressDisplay;
