//! Cycle command implementation
//!
//! Runs exactly one alert-evaluation cycle, for deployments where an
//! external scheduled trigger (cron) drives the cadence.

use crate::alert::AlertCycle;
use crate::config::Config;
use crate::feed::UsgsClient;
use crate::push::{ExpoPushClient, NotificationDispatcher};
use crate::registry::InMemoryRegistry;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct CycleArgs {
    /// JSON file of device registrations to seed the registry with
    #[arg(long)]
    pub registrations: Option<PathBuf>,
}

impl CycleArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let registry = Arc::new(InMemoryRegistry::new());
        if let Some(path) = &self.registrations {
            super::seed_registry(&registry, path).await?;
        }

        let feed = Arc::new(UsgsClient::with_config(config.feed.client_config()));
        let gateway = Arc::new(ExpoPushClient::with_config(config.push.client_config()));
        let dispatcher = NotificationDispatcher::new(gateway);

        let cycle = AlertCycle::new(
            feed,
            registry,
            dispatcher,
            chrono::Duration::minutes(config.alert.lookback_minutes as i64),
            config.alert.limit,
        );

        let report = cycle.run().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(())
    }
}
