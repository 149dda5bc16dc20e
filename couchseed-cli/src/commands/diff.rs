//! `couchseed diff <design>` — show what seed would change.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use couchseed_core::DesignDocument;
use couchseed_sync::{diff, DesignStore, Difference};

use super::{load_desired, print_difference, ConnectionArgs};

/// Arguments for `couchseed diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// JSON (or .yaml/.yml) file, or design directory tree, with the desired
    /// design documents.
    pub design: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print the plan as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PlanJson<'a> {
    database: &'a str,
    additions: Vec<&'a str>,
    changes: Vec<&'a str>,
    deletions: Vec<&'a str>,
}

fn ids(docs: &[DesignDocument]) -> Vec<&str> {
    docs.iter().map(|d| d.id()).collect()
}

impl<'a> PlanJson<'a> {
    fn new(database: &'a str, difference: &'a Difference) -> Self {
        Self {
            database,
            additions: ids(&difference.additions),
            changes: ids(&difference.changes),
            deletions: ids(&difference.deletions),
        }
    }
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let desired = load_desired(&self.design)?;
        let db = self.connection.open()?;

        let observed = db
            .all_design_docs()
            .with_context(|| format!("failed to fetch design documents of '{}'", db.name()))?;
        let difference = diff(&desired, &observed);

        if self.json {
            let plan = PlanJson::new(db.name(), &difference);
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_difference(db.name(), &difference, &observed);
        }
        Ok(())
    }
}
