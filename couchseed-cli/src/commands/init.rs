//! `couchseed init --server <url> --database <name>`

use anyhow::{Context, Result};
use clap::Args;

use couchseed_core::config::{self, Config, DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS};

/// Write the default connection settings.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Server URL.
    #[arg(long, short = 's', default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Database that `diff` and `seed` target when --database is omitted.
    #[arg(long, short = 'd')]
    pub database: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let config = Config {
            server: self.server,
            database: Some(self.database),
            timeout_secs: self.timeout,
        };
        let path = config::save(&config).context("failed to write config")?;

        println!(
            "✓ Targeting '{}' on {}",
            config.database.as_deref().unwrap_or_default(),
            config.server
        );
        println!("  Saved to: {}", path.display());
        Ok(())
    }
}
