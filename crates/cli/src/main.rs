//! climactl CLI: the main entry point.
//!
//! Commands:
//! - `run`: Dual-input control loop (default)
//! - `status`: One-shot sensor and LED snapshot
//! - `doctor`: Diagnose configuration, model backend and hardware
//! - `onboard`: Write a default configuration file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "climactl",
    about = "climactl — climate control through a tool-calling language model",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file (default: ~/.climactl/config.toml)
    #[arg(short, long, global = true, env = "CLIMACTL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the control loop: type commands or press the button
    Run,

    /// Show sensor readings and LED states
    Status,

    /// Diagnose system health
    Doctor,

    /// Write a default configuration file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the transcript.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(config).await?,
        Commands::Status => commands::status::run(config).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
        Commands::Onboard => commands::onboard::run(config).await?,
    }

    Ok(())
}
