//! modsync CLI application
//!
//! Thin adapter around the synchronization engine: parses arguments,
//! initializes logging, dispatches the command, and maps the tagged outcome
//! onto process exit codes (0 for success, setup-only runs, and handoffs;
//! 1 for any fatal error).

use std::process;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use modsync::cli::{handle_check, handle_setup, handle_sync, Cli, Commands};
use modsync::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!(category = e.category(), "Run failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli);

    info!("modsync v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        None | Some(Commands::Sync) => handle_sync(&cli.global).await,
        Some(Commands::Check) => handle_check(&cli.global).await,
        Some(Commands::Setup) => handle_setup(&cli.global).await,
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("modsync={}", cli.log_level()).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
