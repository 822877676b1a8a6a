//! Run command implementation

use crate::alert::AlertCycle;
use crate::config::Config;
use crate::feed::UsgsClient;
use crate::poll::{PollPolicy, PollScheduler, PollUpdate};
use crate::push::{ExpoPushClient, NotificationDispatcher};
use crate::registry::InMemoryRegistry;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON file of device registrations to seed the registry with
    #[arg(long)]
    pub registrations: Option<PathBuf>,

    /// Override the configured cycle interval in seconds
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

impl RunArgs {
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

        let interval =
            Duration::from_secs(self.interval_secs.unwrap_or(config.alert.cycle_interval_secs));
        let poll_config = config.poll.poll_config(PollPolicy::Backoff, interval);

        tracing::info!(interval_secs = interval.as_secs(), "Alert daemon started");
        let (handle, mut updates) = PollScheduler::start(cycle, poll_config);

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(PollUpdate::Completed { .. }) => {
                        // The cycle logs its own report.
                    }
                    Some(PollUpdate::Failed { error, attempt, retry_in }) => {
                        tracing::warn!(
                            %error,
                            attempt,
                            retry_in_secs = retry_in.map(|d| d.as_secs()),
                            "Alert cycle failed"
                        );
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutting down alert daemon");
                    handle.stop();
                    break;
                }
            }
        }

        Ok(())
    }
}
