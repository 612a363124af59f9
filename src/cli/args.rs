//! Command-line argument parsing for modsync
//!
//! Defines the CLI structure using clap derive macros. Running without a
//! subcommand performs a full synchronization, which is what the host
//! launches the tool for.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// modsync - keep a mods directory converged with its server
#[derive(Parser, Debug)]
#[command(
    name = "modsync",
    version,
    about = "Synchronize a game mods directory against a server-declared manifest",
    long_about = "Fetches the server's mod manifest, deletes stale files, downloads missing ones,\n\
and verifies convergence. Replaces its own executable when the server declares\n\
a newer sync tool."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands (defaults to `sync`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Working directory holding config/ and mods/ (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Path of the running sync tool artifact (defaults to the current executable)
    #[arg(long, global = true, value_name = "FILE")]
    pub artifact: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize the mods directory with the server (default)
    Sync,

    /// Show what a run would change without touching any file
    Check,

    /// Interactively configure the update URL
    Setup,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_sync() {
        let cli = Cli::try_parse_from(["modsync"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::try_parse_from(["modsync", "check"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check)));

        let cli = Cli::try_parse_from(["modsync", "setup", "--quiet"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Setup)));
        assert!(cli.global.quiet);
    }

    #[test]
    fn test_log_level() {
        let quiet = Cli::try_parse_from(["modsync", "--quiet"]).unwrap();
        assert_eq!(quiet.log_level(), tracing::Level::ERROR);

        let verbose = Cli::try_parse_from(["modsync", "--verbose"]).unwrap();
        assert_eq!(verbose.log_level(), tracing::Level::INFO);

        let very_verbose = Cli::try_parse_from(["modsync", "--very-verbose"]).unwrap();
        assert_eq!(very_verbose.log_level(), tracing::Level::DEBUG);

        let default = Cli::try_parse_from(["modsync"]).unwrap();
        assert_eq!(default.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_working_dir_is_global() {
        let cli = Cli::try_parse_from(["modsync", "check", "--working-dir", "/srv/game"]).unwrap();
        assert_eq!(
            cli.global.working_dir,
            Some(PathBuf::from("/srv/game"))
        );
    }
}
