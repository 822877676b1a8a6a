//! Watch command implementation
//!
//! Feeds a live event list to the terminal, the way the app's map/list
//! screens consume the UI-facing polling loop.

use crate::config::Config;
use crate::feed::{FeedQuery, SeismicEvent, UsgsClient};
use crate::poll::{FeedPollTask, PollPolicy, PollScheduler, PollUpdate};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Override the configured minimum magnitude
    #[arg(long)]
    pub min_magnitude: Option<f64>,

    /// Override the refresh interval in seconds
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// How many events to print per refresh
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let feed = Arc::new(UsgsClient::with_config(config.feed.client_config()));

        let watch = &config.watch;
        let query = FeedQuery {
            start: chrono::Utc::now() - chrono::Duration::days(watch.lookback_days as i64),
            end: None,
            min_magnitude: self.min_magnitude.unwrap_or(watch.min_magnitude),
            limit: watch.limit,
            region: watch.region,
        };

        let interval = Duration::from_secs(self.interval_secs.unwrap_or(watch.interval_secs));
        let poll_config = config
            .poll
            .poll_config(PollPolicy::FixedInterval, interval);

        // _query_tx keeps the query channel alive; an interactive consumer
        // would use it to retarget the region or magnitude filter.
        let (task, _query_tx) = FeedPollTask::with_query(feed, query);
        let (handle, mut updates) = PollScheduler::start(task, poll_config);

        tracing::info!(interval_secs = interval.as_secs(), "Watching earthquake feed");

        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(PollUpdate::Completed { batch, at }) => {
                        print_events(&batch, at, self.top);
                    }
                    Some(PollUpdate::Failed { error, .. }) => {
                        eprintln!("Unable to refresh earthquakes: {}", error);
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    handle.stop();
                    break;
                }
            }
        }

        Ok(())
    }
}

fn print_events(events: &[SeismicEvent], at: chrono::DateTime<chrono::Utc>, top: usize) {
    println!(
        "{} earthquakes (updated {})",
        events.len(),
        at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for event in events.iter().take(top) {
        println!(
            "  M{:<4.1} {}  ({:.3}, {:.3}) depth {:.1}km",
            event.magnitude_or_zero(),
            event.place,
            event.latitude,
            event.longitude,
            event.depth_km
        );
    }
    if events.len() > top {
        println!("  ... and {} more", events.len() - top);
    }
}
