//! Prometheus metrics

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Completed alert-evaluation cycles
    CyclesCompleted,
    /// Notifications handed to the push gateway
    MessagesDispatched,
    /// Push gateway batches that failed to deliver
    DispatchFailures,
    /// Feed fetches that ended in an error
    FeedErrors,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Registered subscribers seen by the last cycle
    ActiveSubscribers,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One feed fetch round trip
    FeedFetch,
    /// One push gateway batch request
    PushDispatch,
    /// One full alert-evaluation cycle
    AlertCycle,
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, value: u64) {
    let metric_name = match metric {
        CounterMetric::CyclesCompleted => "quakewatch_alert_cycles_total",
        CounterMetric::MessagesDispatched => "quakewatch_messages_dispatched_total",
        CounterMetric::DispatchFailures => "quakewatch_dispatch_failures_total",
        CounterMetric::FeedErrors => "quakewatch_feed_errors_total",
    };

    metrics::counter!(metric_name).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::ActiveSubscribers => "quakewatch_active_subscribers",
    };

    metrics::gauge!(metric_name).set(value);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::FeedFetch => "quakewatch_feed_fetch_latency_ms",
        LatencyMetric::PushDispatch => "quakewatch_push_dispatch_latency_ms",
        LatencyMetric::AlertCycle => "quakewatch_alert_cycle_latency_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}
