//! Alert-evaluation cycle orchestration

use super::AlertEvaluator;
use crate::feed::{EventFeed, FeedQuery};
use crate::poll::PollTask;
use crate::push::NotificationDispatcher;
use crate::registry::{Subscriber, SubscriberRegistry};
use crate::telemetry::{
    increment_counter, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Outcome summary of one alert-evaluation cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Registrations seen this cycle
    pub subscribers: usize,
    /// Subscribers skipped because their feed fetch failed
    pub failed_fetches: usize,
    /// Messages handed to the dispatcher
    pub messages_dispatched: usize,
}

/// One pass of the notification pipeline
///
/// Each subscriber runs its own feed query (filters differ per subscriber,
/// so results cannot be shared), is evaluated against its watermark, and
/// the qualifying messages go out as a single batch at the end.
pub struct AlertCycle {
    feed: Arc<dyn EventFeed>,
    registry: Arc<dyn SubscriberRegistry>,
    dispatcher: NotificationDispatcher,
    /// How far back each subscriber's query window reaches
    lookback: Duration,
    /// Per-query result cap
    limit: u32,
}

impl AlertCycle {
    /// Create a cycle runner over the given collaborators
    pub fn new(
        feed: Arc<dyn EventFeed>,
        registry: Arc<dyn SubscriberRegistry>,
        dispatcher: NotificationDispatcher,
        lookback: Duration,
        limit: u32,
    ) -> Self {
        Self {
            feed,
            registry,
            dispatcher,
            lookback,
            limit,
        }
    }

    fn query_for(&self, subscriber: &Subscriber, now: DateTime<Utc>) -> FeedQuery {
        FeedQuery {
            start: now - self.lookback,
            end: None,
            min_magnitude: subscriber.min_magnitude,
            limit: self.limit,
            region: subscriber.region,
        }
    }

    /// Run one cycle: fetch, evaluate, and dispatch
    ///
    /// A fetch or persist failure for one subscriber is isolated — the
    /// remaining subscribers still evaluate. The cycle as a whole fails
    /// only when the registry is unreadable or every subscriber's fetch
    /// failed (the feed is effectively down, which lets a backoff-driven
    /// caller slow down).
    pub async fn run(&self) -> anyhow::Result<CycleReport> {
        let started = Instant::now();
        let subscribers = self.registry.list_active().await?;
        set_gauge(GaugeMetric::ActiveSubscribers, subscribers.len() as f64);

        let mut report = CycleReport {
            subscribers: subscribers.len(),
            ..Default::default()
        };

        if subscribers.is_empty() {
            tracing::debug!("No registrations to process");
            return Ok(report);
        }

        let now = Utc::now();
        let mut messages = vec![];

        for mut subscriber in subscribers {
            let query = self.query_for(&subscriber, now);

            let fetch_started = Instant::now();
            let events = match self.feed.fetch_events(&query).await {
                Ok(events) => {
                    record_latency(LatencyMetric::FeedFetch, fetch_started.elapsed());
                    events
                }
                Err(e) => {
                    increment_counter(CounterMetric::FeedErrors, 1);
                    report.failed_fetches += 1;
                    tracing::warn!(
                        token = %subscriber.push_token,
                        error = %e,
                        "Skipping subscriber after feed error"
                    );
                    continue;
                }
            };

            if let Some(message) = AlertEvaluator::evaluate(&mut subscriber, &events) {
                // The watermark advance commits before dispatch; a delivery
                // failure later must not cause re-notification.
                if let Err(e) = self.registry.persist(&subscriber).await {
                    tracing::warn!(
                        token = %subscriber.push_token,
                        error = %e,
                        "Failed to persist watermark"
                    );
                }
                messages.push(message);
            }
        }

        if report.failed_fetches == report.subscribers {
            anyhow::bail!(
                "Feed unavailable: all {} subscriber fetches failed",
                report.subscribers
            );
        }

        self.dispatcher.dispatch(&messages).await;
        report.messages_dispatched = messages.len();

        increment_counter(CounterMetric::CyclesCompleted, 1);
        record_latency(LatencyMetric::AlertCycle, started.elapsed());
        tracing::info!(
            subscribers = report.subscribers,
            failed_fetches = report.failed_fetches,
            messages = report.messages_dispatched,
            "Alert cycle complete"
        );

        Ok(report)
    }
}

#[async_trait]
impl PollTask for AlertCycle {
    type Output = CycleReport;

    fn fingerprint(&self) -> u64 {
        // Cycle parameters are fixed for the process lifetime.
        0
    }

    async fn poll(&self) -> anyhow::Result<CycleReport> {
        self.run().await
    }
}
