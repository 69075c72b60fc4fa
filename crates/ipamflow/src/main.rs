mod commands;
mod utils;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ipam")]
#[command(about = "Declarative Micetro IPAM management", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the platform in line with the manifest
    Apply {
        /// Manifest path (defaults to the discovered ipam.kdl)
        manifest: Option<PathBuf>,
        /// Only reconcile resources with this name
        #[arg(long)]
        only: Option<String>,
        /// Print one JSON object per resource
        #[arg(long)]
        json: bool,
    },
    /// Show what apply would change, without changing anything
    Plan {
        /// Manifest path (defaults to the discovered ipam.kdl)
        manifest: Option<PathBuf>,
        /// Only plan resources with this name
        #[arg(long)]
        only: Option<String>,
    },
    /// Check the manifest without contacting the server
    Validate {
        /// Manifest path (defaults to the discovered ipam.kdl)
        manifest: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Apply {
            manifest,
            only,
            json,
        } => commands::apply::handle(manifest, only.as_deref(), json).await,
        Commands::Plan { manifest, only } => commands::plan::handle(manifest, only.as_deref()).await,
        Commands::Validate { manifest } => commands::validate::handle(manifest),
        Commands::Version => {
            println!("ipamflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
