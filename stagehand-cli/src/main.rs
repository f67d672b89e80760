//! Stagehand: render, deploy and remove service configuration on a server.
//!
//! # Usage
//!
//! ```text
//! stagehand [--config <path>] [--verbose] render --target <name>
//! stagehand deploy --target <name> [--dry-run] [--json]
//! stagehand nuke --target <name> [--json]
//! stagehand status --target <name> [--json]
//! stagehand service start|stop|restart <service> --target <name>
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    deploy::DeployArgs, nuke::NukeArgs, render::RenderArgs, service::ServiceArgs,
    status::StatusArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stagehand",
    version,
    about = "Render and deploy per-service configuration files to a server",
    long_about = None,
)]
struct Cli {
    /// Path to the project config (default: ./stagehand.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every service template into the local staging directory.
    Render(RenderArgs),

    /// Upload changed services and run their post-install actions.
    Deploy(DeployArgs),

    /// Remove every service's installed file and undo its actions.
    Nuke(NukeArgs),

    /// Compare local and installed fingerprints without changing anything.
    Status(StatusArgs),

    /// Start, stop or restart one service's init job.
    Service(ServiceArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Render(args) => args.run(config),
        Commands::Deploy(args) => args.run(config),
        Commands::Nuke(args) => args.run(config),
        Commands::Status(args) => args.run(config),
        Commands::Service(args) => args.run(config),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
