//! Per-subscriber alert evaluation

use crate::feed::SeismicEvent;
use crate::push::{MessagePayload, OutboundMessage};
use crate::registry::Subscriber;

/// Decides whether a cycle's events warrant notifying a subscriber
pub struct AlertEvaluator;

impl AlertEvaluator {
    /// Evaluate one subscriber against one cycle's events
    ///
    /// `events` must be ordered newest-first, as the feed returns them.
    /// Only the newest event is considered; older backlogged events in the
    /// same window are not replayed as separate notifications. When a
    /// message is produced, the subscriber's watermark advances to the
    /// event's occurrence time — the caller is responsible for persisting
    /// that change.
    pub fn evaluate(
        subscriber: &mut Subscriber,
        events: &[SeismicEvent],
    ) -> Option<OutboundMessage> {
        let newest = events.first()?;

        // Absent magnitude reads as 0.0 for the threshold comparison and
        // for the rendered title alike.
        let magnitude = newest.magnitude_or_zero();
        if magnitude < subscriber.significant_magnitude_threshold {
            return None;
        }

        if let Some(watermark) = subscriber.last_notified_at {
            if newest.occurred_at <= watermark {
                return None;
            }
        }

        subscriber.advance_watermark(newest.occurred_at);

        Some(OutboundMessage {
            to: subscriber.push_token.clone(),
            sound: Some("default".to_string()),
            title: format!("Earthquake M{:.1}", magnitude),
            body: newest.place.clone(),
            data: MessagePayload {
                usgs_id: newest.id.clone(),
                country: subscriber.country.clone(),
            },
        })
    }
}
