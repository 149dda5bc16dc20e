//! couchseed — keep a database's design documents in line with a file or a
//! design directory tree.
//!
//! # Usage
//!
//! ```text
//! couchseed init --server <url> --database <name> [--timeout <secs>]
//! couchseed diff <design> [--server <url>] [--database <name>] [--json]
//! couchseed seed <design> [--server <url>] [--database <name>] [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, init::InitArgs, seed::SeedArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "couchseed",
    version,
    about = "Reconcile design documents (views, filters) with a CouchDB database",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.couchseed/config.yaml with the default server and database.
    Init(InitArgs),

    /// Show what `seed` would create, update and delete.
    Diff(DiffArgs),

    /// Create, update and delete design documents to match the desired set.
    Seed(SeedArgs),
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Seed(args) => args.run(),
    }
}
