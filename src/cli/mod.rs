//! CLI interface for quakewatch
//!
//! Provides subcommands for:
//! - `run`: Start the alert daemon (self-looping evaluation cycles)
//! - `watch`: Follow the live event list for a region
//! - `cycle`: Run exactly one alert-evaluation cycle (cron mode)
//! - `status`: Show current state
//! - `config`: Show configuration

mod cycle;
mod run;
mod watch;

pub use cycle::CycleArgs;
pub use run::RunArgs;
pub use watch::WatchArgs;

use crate::registry::{InMemoryRegistry, RegistrationRequest};
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "quakewatch")]
#[command(about = "Earthquake feed monitor with regional push alerts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the alert daemon
    Run(RunArgs),
    /// Follow the live event list
    Watch(WatchArgs),
    /// Run one alert-evaluation cycle and exit
    Cycle(CycleArgs),
    /// Show current state
    Status,
    /// Show configuration
    Config,
}

/// Load device registrations from a JSON file into the registry
///
/// The file holds an array of registration payloads in the same shape the
/// registration endpoint would receive. Any invalid entry aborts the load.
pub(crate) async fn seed_registry(
    registry: &InMemoryRegistry,
    path: &Path,
) -> anyhow::Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let requests: Vec<RegistrationRequest> = serde_json::from_str(&content)?;
    let count = requests.len();

    for request in requests {
        registry
            .register(request)
            .await
            .map_err(|e| anyhow::anyhow!("Invalid registration in {}: {}", path.display(), e))?;
    }

    tracing::info!(count, path = %path.display(), "Seeded subscriber registry");
    Ok(count)
}
