//! Notification dispatcher

use super::{OutboundMessage, PushGateway};
use crate::telemetry::{increment_counter, record_latency, CounterMetric, LatencyMetric};
use std::sync::Arc;
use std::time::Instant;

/// Batches qualifying alerts into one gateway request
///
/// Delivery is at-most-once: a failed batch is logged and dropped, never
/// retried within the cycle, and never rolls back the watermark advances
/// already committed by the evaluator.
pub struct NotificationDispatcher {
    gateway: Arc<dyn PushGateway>,
}

impl NotificationDispatcher {
    /// Create a dispatcher delivering through the given gateway
    pub fn new(gateway: Arc<dyn PushGateway>) -> Self {
        Self { gateway }
    }

    /// Deliver the batch
    ///
    /// An empty batch performs no network call. Gateway failures are
    /// swallowed here; they must not surface to the polling cycle.
    pub async fn dispatch(&self, messages: &[OutboundMessage]) {
        if messages.is_empty() {
            return;
        }

        let started = Instant::now();
        match self.gateway.send_batch(messages).await {
            Ok(()) => {
                increment_counter(CounterMetric::MessagesDispatched, messages.len() as u64);
                tracing::info!(count = messages.len(), "Dispatched notification batch");
            }
            Err(e) => {
                increment_counter(CounterMetric::DispatchFailures, 1);
                tracing::error!(
                    error = %e,
                    count = messages.len(),
                    "Failed to deliver notification batch"
                );
            }
        }
        record_latency(LatencyMetric::PushDispatch, started.elapsed());
    }
}
