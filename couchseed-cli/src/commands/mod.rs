pub mod diff;
pub mod init;
pub mod seed;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use couchseed_core::{config, desired, DesignDocument};
use couchseed_http::{Client, Database};
use couchseed_sync::{render_change, Difference};

/// Server and database selection, overriding ~/.couchseed/config.yaml.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Server URL, e.g. http://127.0.0.1:5984.
    #[arg(long, short = 's')]
    pub server: Option<String>,

    /// Target database name.
    #[arg(long, short = 'd')]
    pub database: Option<String>,
}

impl ConnectionArgs {
    pub fn open(&self) -> Result<Database> {
        let config = config::load().context("failed to load config")?;
        let server = self.server.clone().unwrap_or(config.server);
        let database = self
            .database
            .clone()
            .or(config.database)
            .context("no database given; pass --database or run `couchseed init`")?;

        let client = Client::with_timeout(&server, Duration::from_secs(config.timeout_secs))
            .with_context(|| format!("cannot connect to '{server}'"))?;
        Ok(client.database(&database))
    }
}

pub(crate) fn load_desired(path: &Path) -> Result<Vec<DesignDocument>> {
    desired::load_desired_at(path)
        .with_context(|| format!("cannot load design documents from '{}'", path.display()))
}

/// Print a difference, with view diffs for changes against `observed`.
pub(crate) fn print_difference(
    database: &str,
    difference: &Difference,
    observed: &[DesignDocument],
) {
    if difference.is_empty() {
        println!("✓ '{database}' design documents are up to date");
        return;
    }

    println!(
        "'{database}': {} to create, {} to update, {} to delete",
        difference.additions.len(),
        difference.changes.len(),
        difference.deletions.len()
    );
    for doc in &difference.additions {
        println!("{}", format!("  + {}", doc.id()).green());
    }
    for doc in &difference.changes {
        println!("{}", format!("  ~ {}", doc.id()).yellow());
        if let Some(current) = observed.iter().find(|o| o.id() == doc.id()) {
            for line in render_change(current, doc).lines() {
                println!("      {line}");
            }
        }
    }
    for doc in &difference.deletions {
        println!("{}", format!("  - {}", doc.id()).red());
    }
}
