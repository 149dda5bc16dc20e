//! `couchseed seed <design>` — apply the difference to the database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use couchseed_sync::{plan, seed, SeedReport};

use super::{load_desired, print_difference, ConnectionArgs};

/// Arguments for `couchseed seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// JSON (or .yaml/.yml) file, or design directory tree, with the desired
    /// design documents.
    pub design: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Show what would be written without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl SeedArgs {
    pub fn run(self) -> Result<()> {
        let desired = load_desired(&self.design)?;
        let db = self.connection.open()?;

        if self.dry_run {
            let difference = plan(&db, &desired)
                .with_context(|| format!("failed to fetch design documents of '{}'", db.name()))?;
            print!("[dry-run] ");
            // View diffs need the stored documents; `couchseed diff` shows them.
            print_difference(db.name(), &difference, &[]);
            return Ok(());
        }

        let report = seed(&db, &desired)
            .with_context(|| format!("seed failed for '{}'", db.name()))?;
        print_report(db.name(), &report);
        Ok(())
    }
}

fn print_report(database: &str, report: &SeedReport) {
    if report.is_noop() {
        println!("✓ '{database}' — nothing to do");
        return;
    }

    println!(
        "✓ '{database}' seeded ({} created, {} updated, {} deleted)",
        report.created.len(),
        report.updated.len(),
        report.deleted.len()
    );
    for (id, rev) in &report.created {
        println!("  +  {id} ({rev})");
    }
    for (id, rev) in &report.updated {
        println!("  ~  {id} ({rev})");
    }
    for id in &report.deleted {
        println!("  -  {id}");
    }
}
